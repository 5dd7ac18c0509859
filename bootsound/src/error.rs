//! Error types for bootsound
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! None of these ever reach the host: the orchestrator logs them and lets boot continue.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the boot sound player
#[derive(Error, Debug)]
pub enum Error {
    /// WAV file missing, a directory, or over the size limit
    #[error("File unavailable: {path:?}: {reason}")]
    FileUnavailable { path: PathBuf, reason: String },

    /// Opening or reading the WAV file failed, including short reads
    #[error("Read failure: {path:?}: {reason}")]
    ReadFailure { path: PathBuf, reason: String },

    /// WAV header could not be decoded
    #[error("WAV decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Channel count outside {1, 2}
    #[error("Unsupported channel layout: {0} channels")]
    UnsupportedChannelLayout(u16),

    /// Bit depth other than 8, 16, 24 or 32
    #[error("Unsupported bit depth: {0} bits per sample")]
    UnsupportedBitDepth(u16),

    /// Audio port open/output/release failure
    #[error(transparent)]
    Port(#[from] PortError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// WAV header decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before a required field
    #[error("buffer too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// No `data` marker after the fixed header prefix
    #[error("no \"data\" chunk marker found")]
    DataChunkNotFound,

    /// `channels * bits_per_sample` is zero, so the sample count is undefined
    #[error("invalid channel count or bit depth: channels={channels}, bits_per_sample={bits_per_sample}")]
    InvalidChannelOrBitDepth { channels: u16, bits_per_sample: u16 },
}

/// Audio port operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Open,
    Output,
    Flush,
    Release,
}

impl fmt::Display for PortOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortOp::Open => write!(f, "open"),
            PortOp::Output => write!(f, "output"),
            PortOp::Flush => write!(f, "flush"),
            PortOp::Release => write!(f, "release"),
        }
    }
}

/// Failure reported by an audio output port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audio port {op} failed: {reason}")]
pub struct PortError {
    pub op: PortOp,
    pub reason: String,
}

impl PortError {
    pub fn new(op: PortOp, reason: impl Into<String>) -> Self {
        Self {
            op,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type using bootsound Error
pub type Result<T> = std::result::Result<T, Error>;
