//! WAV test file generation
//!
//! `canonical_wav` builds the 44-byte PCM layout by hand so tests control
//! every header byte; `generate_sine_wav` goes through hound to exercise
//! files written by a real encoder.

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

/// Build a canonical PCM WAV image around `data`
pub fn canonical_wav(channels: u16, bits_per_sample: u16, sample_rate: u32, data: &[u8]) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let mut buf = Vec::with_capacity(44 + data.len());
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buf.extend_from_slice(data);
    buf
}

/// Insert a `LIST` chunk between the `fmt ` chunk and the `data` chunk
pub fn with_list_chunk(wav: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = wav[..36].to_vec();
    out.extend_from_slice(b"LIST");
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&wav[36..]);
    out
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).expect("Failed to write test WAV");
}

/// Generate a 16-bit sine wave WAV file with hound
pub fn generate_sine_wav<P: AsRef<Path>>(
    path: P,
    channels: u16,
    sample_rate: u32,
    frames: u32,
    frequency_hz: f32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = ((2.0 * PI * frequency_hz * t).sin() * 0.5 * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()?;
    Ok(())
}
