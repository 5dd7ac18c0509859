//! Chunked PCM playback

pub mod engine;

pub use engine::{align_up, play, BlockPlan, PlaybackSummary, BLOCK_ALIGN, MAX_BLOCK_LEN};
