//! Audio output port contract
//!
//! Mirrors the platform's port-per-block audio API: open a port for a
//! fixed block length and format, submit blocks, submit `None` to mark the
//! end of the stream, release. Every call may fail; callers treat any
//! failure as fatal for the current playback pass.

use crate::audio::types::{PortId, PortParams};
use crate::error::PortError;

/// Capability to play PCM through output ports
///
/// Blocks are interleaved 16-bit signed little-endian PCM holding exactly
/// `params.sample_len` frames. `output` blocks until the device has
/// accepted the block, which paces playback.
pub trait AudioOut {
    /// Open a port for blocks described by `params`
    fn open_port(&mut self, params: PortParams) -> Result<PortId, PortError>;

    /// Submit one block, or `None` to flush and end the stream
    fn output(&mut self, port: PortId, block: Option<&[u8]>) -> Result<(), PortError>;

    /// Release a port opened by `open_port`
    fn release_port(&mut self, port: PortId) -> Result<(), PortError>;
}

impl<T: AudioOut + ?Sized> AudioOut for &mut T {
    fn open_port(&mut self, params: PortParams) -> Result<PortId, PortError> {
        (**self).open_port(params)
    }

    fn output(&mut self, port: PortId, block: Option<&[u8]>) -> Result<(), PortError> {
        (**self).output(port, block)
    }

    fn release_port(&mut self, port: PortId) -> Result<(), PortError> {
        (**self).release_port(port)
    }
}

impl<T: AudioOut + ?Sized> AudioOut for Box<T> {
    fn open_port(&mut self, params: PortParams) -> Result<PortId, PortError> {
        (**self).open_port(params)
    }

    fn output(&mut self, port: PortId, block: Option<&[u8]>) -> Result<(), PortError> {
        (**self).output(port, block)
    }

    fn release_port(&mut self, port: PortId) -> Result<(), PortError> {
        (**self).release_port(port)
    }
}
