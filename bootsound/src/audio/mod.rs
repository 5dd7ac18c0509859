//! Audio parsing and output
//!
//! - `scan`: byte-pattern search for chunk markers
//! - `wav`: RIFF/WAVE header decoding
//! - `port`: the audio output port contract consumed by playback
//! - `output`: cpal-backed implementation of that contract

pub mod output;
pub mod port;
pub mod scan;
pub mod types;
pub mod wav;

pub use output::CpalAudioOut;
pub use port::AudioOut;
pub use types::{ChannelLayout, PortId, PortParams, SampleWidth};
pub use wav::{decode_header, FormatType, WavHeader};
