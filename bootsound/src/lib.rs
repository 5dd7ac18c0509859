//! # Boot Sound Player Library (bootsound)
//!
//! Plays a single WAV file once the system shell reports that it has
//! finished initializing.
//!
//! **Purpose:** Locate the header fields and `data` chunk of an in-memory
//! WAV image, then stream the PCM samples through an audio output port in
//! block-aligned, length-capped blocks.
//!
//! **Architecture:** scanner → header decoder → chunked playback engine,
//! driven by the boot-gate orchestrator on a dedicated worker thread.

pub mod audio;
pub mod boot;
pub mod config;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
