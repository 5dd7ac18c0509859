//! Test helper modules for bootsound integration tests
//!
//! - RecordingOut: in-memory `AudioOut` that records every port call
//! - wav_builder: hand-built and hound-generated WAV files

#![allow(dead_code)]

pub mod recording_out;
pub mod wav_builder;

pub use recording_out::{PortCall, RecordingOut};
pub use wav_builder::{canonical_wav, generate_sine_wav, with_list_chunk, write_file};
