//! Runtime configuration for the boot sound worker
//!
//! Combines the shared TOML bootstrap configuration with command-line
//! overrides and converts it into the values the orchestrator uses.

use crate::audio::wav::HEADER_PREFIX_LEN;
use crate::error::{Error, Result};
use bootsound_common::config::{
    resolve_wav_path, TomlConfig, DEFAULT_GRACE_PERIOD_MS, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_POLL_INTERVAL_MS, WAV_PATH_ENV,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Smallest useful file: fixed prefix plus the `data` marker and size
const MIN_FILE_SIZE: u64 = HEADER_PREFIX_LEN as u64 + 8;

/// Complete boot sound configuration
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// WAV file to play
    pub wav_path: PathBuf,

    /// Largest accepted file, also the size of the load buffer
    pub max_file_size: u64,

    /// Interval between readiness polls
    pub poll_interval: Duration,

    /// Wait after readiness before loading the file
    pub grace_period: Duration,
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub wav_path: Option<PathBuf>,
}

impl BootConfig {
    /// Configuration with built-in defaults for the given file
    pub fn new(wav_path: impl Into<PathBuf>) -> Self {
        Self {
            wav_path: wav_path.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            grace_period: Duration::from_millis(DEFAULT_GRACE_PERIOD_MS),
        }
    }

    /// Build configuration from TOML values and CLI overrides
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the size limit cannot hold a WAV header
    /// or the poll interval is zero.
    pub fn from_toml(toml: &TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let wav_path = resolve_wav_path(
            overrides.wav_path.as_deref(),
            WAV_PATH_ENV,
            toml.wav_path.as_deref(),
        );

        let config = Self {
            wav_path,
            max_file_size: toml.max_file_size,
            poll_interval: Duration::from_millis(toml.poll_interval_ms),
            grace_period: Duration::from_millis(toml.grace_period_ms),
        };
        config.validate()?;

        info!("WAV file: {:?}", config.wav_path);
        Ok(config)
    }

    /// Check invariants the orchestrator relies on
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size < MIN_FILE_SIZE {
            return Err(Error::Config(format!(
                "max_file_size {} is smaller than a WAV header ({} bytes)",
                self.max_file_size, MIN_FILE_SIZE
            )));
        }
        if usize::try_from(self.max_file_size).is_err() {
            return Err(Error::Config(format!(
                "max_file_size {} does not fit in memory",
                self.max_file_size
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll_interval_ms must be non-zero".to_string()));
        }
        Ok(())
    }
}
