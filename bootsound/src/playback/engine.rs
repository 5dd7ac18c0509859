//! Chunked playback engine
//!
//! Streams a decoded WAV's PCM data through [`AudioOut`] one block at a
//! time. Every block gets its own port: open, submit, submit the end
//! sentinel, release. Ports may be reclaimed by the system between blocks
//! during boot, so none is held across blocks.
//!
//! The total frame count is rounded up to a multiple of [`BLOCK_ALIGN`]
//! because ports only accept aligned lengths, and each block is capped at
//! [`MAX_BLOCK_LEN`] frames.

use std::borrow::Cow;

use crate::audio::port::AudioOut;
use crate::audio::types::{ChannelLayout, PortParams, SampleWidth};
use crate::audio::wav::WavHeader;
use crate::error::{DecodeError, Error, PortError, Result};
use tracing::{debug, info, warn};

/// Port lengths must be a multiple of this many frames
pub const BLOCK_ALIGN: u64 = 64;

/// Largest block a single port accepts, in frames
pub const MAX_BLOCK_LEN: u32 = 65472;

/// Round `n` up to the next multiple of `align` (a power of two)
pub fn align_up(n: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (n + (align - 1)) & !(align - 1)
}

/// Sequence of block lengths covering `total` frames
///
/// Every block is `MAX_BLOCK_LEN` except the last, which carries the
/// remainder.
#[derive(Debug, Clone)]
pub struct BlockPlan {
    total: u64,
    count: u64,
}

impl BlockPlan {
    pub fn new(total: u64) -> Self {
        Self { total, count: 0 }
    }
}

impl Iterator for BlockPlan {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let remaining = self.total - self.count;
        if remaining == 0 {
            return None;
        }
        let len = remaining.min(MAX_BLOCK_LEN as u64) as u32;
        self.count += len as u64;
        Some(len)
    }
}

/// Outcome of a completed playback pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Ports opened (one per block)
    pub blocks: u32,
    /// Frames submitted, including alignment padding
    pub samples_submitted: u64,
}

/// Slice `len` bytes at `start`, zero-padding past the end of `pcm`
fn block_at(pcm: &[u8], start: usize, len: usize) -> Cow<'_, [u8]> {
    let end = start.saturating_add(len);
    if end <= pcm.len() {
        return Cow::Borrowed(&pcm[start..end]);
    }
    let mut padded = vec![0u8; len];
    if start < pcm.len() {
        let available = &pcm[start..];
        padded[..available.len()].copy_from_slice(available);
    }
    Cow::Owned(padded)
}

/// Play one block through a freshly opened port
fn play_block<A: AudioOut + ?Sized>(
    out: &mut A,
    params: PortParams,
    block: &[u8],
) -> std::result::Result<(), PortError> {
    let port = out.open_port(params)?;
    debug!(
        "Port {} open: sample_len={}, sample_rate={}, layout={:?}",
        port.0, params.sample_len, params.sample_rate, params.layout
    );

    let submitted = out
        .output(port, Some(block))
        .and_then(|()| out.output(port, None));

    if let Err(e) = submitted {
        if let Err(release_err) = out.release_port(port) {
            warn!("Releasing port {} after failure also failed: {}", port.0, release_err);
        }
        return Err(e);
    }

    out.release_port(port)?;
    debug!("Port {} released", port.0);
    Ok(())
}

/// Stream the PCM data described by `header` through `out`
///
/// `pcm` starts at the first sample byte. Fails before any port operation
/// if the channel count is not 1 or 2, the frame size is zero, or the bit
/// depth has no [`SampleWidth`]; any port failure aborts the remaining blocks.
pub fn play<A: AudioOut + ?Sized>(
    out: &mut A,
    header: &WavHeader,
    pcm: &[u8],
) -> Result<PlaybackSummary> {
    let layout = ChannelLayout::from_channels(header.channels)
        .ok_or(Error::UnsupportedChannelLayout(header.channels))?;

    let frame_size = header.frame_size();
    if frame_size == 0 {
        return Err(DecodeError::InvalidChannelOrBitDepth {
            channels: header.channels,
            bits_per_sample: header.bits_per_sample,
        }
        .into());
    }
    let width = SampleWidth::from_bits(header.bits_per_sample)
        .ok_or(Error::UnsupportedBitDepth(header.bits_per_sample))?;

    let total = align_up(header.num_samples, BLOCK_ALIGN);
    info!(
        "Playing {} samples ({} aligned) at {} Hz, {:?}, {:?}",
        header.num_samples, total, header.sample_rate, layout, width
    );

    let mut summary = PlaybackSummary {
        blocks: 0,
        samples_submitted: 0,
    };
    let mut cursor = 0usize;

    for sample_len in BlockPlan::new(total) {
        debug!(
            "Block {}: offset={}, count={}, sample_len={}, remaining={}",
            summary.blocks,
            cursor,
            summary.samples_submitted,
            sample_len,
            total - summary.samples_submitted
        );

        let params = PortParams {
            sample_len,
            sample_rate: header.sample_rate,
            layout,
            width,
        };
        let block_bytes = sample_len as usize * frame_size;
        let block = block_at(pcm, cursor, block_bytes);

        play_block(out, params, &block)?;

        summary.blocks += 1;
        summary.samples_submitted += sample_len as u64;
        cursor += block_bytes;
    }

    info!(
        "PCM playback ended: {} block(s), {} samples",
        summary.blocks, summary.samples_submitted
    );
    Ok(summary)
}
