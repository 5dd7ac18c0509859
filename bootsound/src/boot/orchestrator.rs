//! Boot-gate orchestrator
//!
//! Runs once per boot on a dedicated worker thread:
//! 1. Poll the readiness signal until the shell is up, then wait a grace period
//! 2. Check the WAV file (exists, not a directory, within the size limit)
//! 3. Load it into a buffer sized to the limit
//! 4. Decode the header, open the audio output, play
//!
//! Nothing here is allowed to hold up boot: every failure is logged and the
//! worker exits. The file buffer is owned by [`WavFile`] and dropped on
//! every path out of a pass.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::audio::port::AudioOut;
use crate::audio::wav::{decode_header, WavHeader};
use crate::config::BootConfig;
use crate::error::{Error, PortError, Result};
use crate::playback::{self, PlaybackSummary};
use crate::boot::ready::ReadinessSignal;
use tracing::{debug, error, info, warn};

/// Name of the boot sound worker thread
pub const WORKER_THREAD_NAME: &str = "bootsound_thread";

/// Result of one boot-time playback attempt, as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    Played(PlaybackSummary),
    Failed,
}

/// WAV file image loaded into a buffer sized to the configured limit
///
/// Bytes past the end of the file are zero.
pub struct WavFile {
    path: PathBuf,
    buffer: Vec<u8>,
    len: usize,
}

impl WavFile {
    /// Check the file and return its size
    ///
    /// A size exactly at `max_size` is accepted.
    pub fn check(path: &Path, max_size: u64) -> Result<u64> {
        let unavailable = |reason: String| Error::FileUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = std::fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
        if metadata.is_dir() {
            return Err(unavailable("is a directory".to_string()));
        }
        if metadata.len() > max_size {
            return Err(unavailable(format!(
                "size {} exceeds limit {}",
                metadata.len(),
                max_size
            )));
        }

        info!("File check okay: {:?} ({} bytes)", path, metadata.len());
        Ok(metadata.len())
    }

    /// Check and read the whole file
    pub fn load(path: &Path, max_size: u64) -> Result<Self> {
        let size = Self::check(path, max_size)?;
        let file = File::open(path).map_err(|e| Error::ReadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::read_from(path, file, size, max_size)
    }

    /// Read `size` bytes from `reader` into a buffer of `max_size` bytes
    ///
    /// `path` only labels errors and logs.
    pub fn read_from<R: Read>(path: &Path, mut reader: R, size: u64, max_size: u64) -> Result<Self> {
        let read_failure = |reason: String| Error::ReadFailure {
            path: path.to_path_buf(),
            reason,
        };
        if size > max_size {
            return Err(read_failure(format!("size {} exceeds buffer of {}", size, max_size)));
        }

        let capacity = usize::try_from(max_size)
            .map_err(|_| read_failure(format!("buffer size {} does not fit in memory", max_size)))?;
        let size = size as usize;
        let mut buffer = vec![0u8; capacity];
        debug!("Allocated {} byte file buffer", capacity);

        reader.read_exact(&mut buffer[..size]).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                read_failure(format!("short read, expected {} bytes", size))
            } else {
                read_failure(e.to_string())
            }
        })?;

        info!("WAV read into memory with size of {}", size);
        Ok(Self {
            path: path.to_path_buf(),
            buffer,
            len: size,
        })
    }

    /// The file's bytes
    pub fn contents(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// PCM bytes from the start of the data chunk to the end of the buffer
    pub fn pcm(&self, header: &WavHeader) -> &[u8] {
        self.buffer.get(header.pcm_offset()..).unwrap_or(&[])
    }
}

impl Drop for WavFile {
    fn drop(&mut self) {
        debug!("Released {} byte file buffer for {:?}", self.buffer.len(), self.path);
    }
}

/// One boot-time playback pass
pub struct BootSound<R> {
    config: BootConfig,
    ready: R,
}

impl<R: ReadinessSignal> BootSound<R> {
    pub fn new(config: BootConfig, ready: R) -> Self {
        Self { config, ready }
    }

    /// Block until the shell is ready, then sleep the grace period
    pub fn wait_for_shell(&self) {
        while !self.ready.is_ready() {
            info!("Waiting for shell init");
            std::thread::sleep(self.config.poll_interval);
        }
        std::thread::sleep(self.config.grace_period);
        info!("Shell init detected");
    }

    /// Run the pass, creating the audio output only once the file decodes
    pub fn try_run_with<A, F>(&self, make_output: F) -> Result<PlaybackSummary>
    where
        A: AudioOut,
        F: FnOnce() -> std::result::Result<A, PortError>,
    {
        self.wait_for_shell();

        let wav = WavFile::load(&self.config.wav_path, self.config.max_file_size)?;
        let header = decode_header(wav.contents())?;
        let mut out = make_output()?;
        let summary = playback::play(&mut out, &header, wav.pcm(&header))?;
        Ok(summary)
    }

    /// Run the pass against an existing audio output
    pub fn try_run<A: AudioOut + ?Sized>(&self, out: &mut A) -> Result<PlaybackSummary> {
        self.try_run_with(|| Ok::<_, PortError>(out))
    }

    /// Run the pass, logging any failure instead of returning it
    pub fn run_with<A, F>(&self, make_output: F) -> BootOutcome
    where
        A: AudioOut,
        F: FnOnce() -> std::result::Result<A, PortError>,
    {
        match self.try_run_with(make_output) {
            Ok(summary) => BootOutcome::Played(summary),
            Err(e) => {
                log_failure(&e);
                BootOutcome::Failed
            }
        }
    }

    /// [`run_with`](Self::run_with) against an existing audio output
    pub fn run<A: AudioOut + ?Sized>(&self, out: &mut A) -> BootOutcome {
        self.run_with(|| Ok::<_, PortError>(out))
    }
}

fn log_failure(e: &Error) {
    match e {
        Error::FileUnavailable { .. } => warn!("Boot sound skipped: {}", e),
        _ => error!("Boot sound failed: {}", e),
    }
}

/// Start the boot sound worker thread
///
/// `make_output` runs on the worker, so the audio output itself does not
/// need to be `Send`.
pub fn spawn<R, F, A>(
    config: BootConfig,
    ready: R,
    make_output: F,
) -> std::io::Result<JoinHandle<BootOutcome>>
where
    R: ReadinessSignal + 'static,
    F: FnOnce() -> std::result::Result<A, PortError> + Send + 'static,
    A: AudioOut,
{
    std::thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || BootSound::new(config, ready).run_with(make_output))
}
