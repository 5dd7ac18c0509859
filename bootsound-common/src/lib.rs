//! # Boot Sound Common Library
//!
//! Shared code for the boot sound player:
//! - Error types
//! - TOML configuration loading and WAV path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
