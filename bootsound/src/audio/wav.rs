//! RIFF/WAVE header decoding
//!
//! Reads the canonical 36-byte prefix (RIFF header plus a 16-byte `fmt `
//! chunk) at fixed offsets, then scans for the `data` marker because some
//! encoders place `LIST` or other chunks in between.
//!
//! Decoding is permissive: the four ASCII tags are recorded but not
//! required to match. Channel layout is enforced later by the playback
//! engine; the decoder only refuses values that make the sample count
//! undefined.

use crate::audio::scan::find_offset;
use crate::error::DecodeError;
use tracing::{debug, info, warn};

/// Bytes covered by the fixed-offset header fields
pub const HEADER_PREFIX_LEN: usize = 36;

/// Marker opening the PCM data chunk
pub const DATA_MARKER: &[u8; 4] = b"data";

/// `data` marker plus its 4-byte size field
const DATA_CHUNK_HEADER_LEN: usize = 8;

/// WAV `format_type` codes the player recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    Pcm,
    IeeeFloat,
    ALaw,
    MuLaw,
    Unknown(u16),
}

impl FormatType {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => FormatType::Pcm,
            3 => FormatType::IeeeFloat,
            6 => FormatType::ALaw,
            7 => FormatType::MuLaw,
            other => FormatType::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatType::Pcm => "PCM",
            FormatType::IeeeFloat => "IEEE float",
            FormatType::ALaw => "A-law",
            FormatType::MuLaw => "Mu-law",
            FormatType::Unknown(_) => "unknown",
        }
    }
}

/// Decoded WAV header
///
/// Created once per playback pass and handed to the playback engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub riff: [u8; 4],
    pub overall_size: u32,
    pub wave: [u8; 4],
    pub fmt_chunk_marker: [u8; 4],
    pub length_of_fmt: u32,
    pub format_type: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byterate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_chunk_header: [u8; 4],
    pub data_size: u32,
    /// Frames in the data chunk: `8 * data_size / (channels * bits_per_sample)`
    pub num_samples: u64,
    /// Offset of the `data` marker from the start of the file
    pub data_offset: usize,
}

impl WavHeader {
    /// Offset of the first PCM byte from the start of the file
    pub fn pcm_offset(&self) -> usize {
        self.data_offset + DATA_CHUNK_HEADER_LEN
    }

    /// Bytes per frame (all channels of one sample instant)
    pub fn frame_size(&self) -> usize {
        (self.channels as usize * self.bits_per_sample as usize) / 8
    }

    pub fn format(&self) -> FormatType {
        FormatType::from_code(self.format_type)
    }

    /// Approximate duration derived from the RIFF size and byte rate
    ///
    /// `None` when the byte rate is zero.
    pub fn approx_duration_secs(&self) -> Option<f32> {
        if self.byterate == 0 {
            None
        } else {
            Some(self.overall_size as f32 / self.byterate as f32)
        }
    }
}

/// Compute the frame count of a data chunk
///
/// Integer floor division, widened to 64 bits so `8 * data_size` cannot
/// overflow.
pub fn sample_count(
    data_size: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Result<u64, DecodeError> {
    let denominator = channels as u64 * bits_per_sample as u64;
    if denominator == 0 {
        return Err(DecodeError::InvalidChannelOrBitDepth {
            channels,
            bits_per_sample,
        });
    }
    Ok(8 * data_size as u64 / denominator)
}

fn tag(buf: &[u8], at: usize) -> [u8; 4] {
    [buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(tag(buf, at))
}

fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Decode the WAV header of an in-memory file image
///
/// # Errors
/// - `Truncated` if the buffer ends inside the fixed prefix or the data
///   size field
/// - `DataChunkNotFound` if no `data` marker follows the prefix
/// - `InvalidChannelOrBitDepth` if `channels * bits_per_sample == 0`
pub fn decode_header(buf: &[u8]) -> Result<WavHeader, DecodeError> {
    if buf.len() < HEADER_PREFIX_LEN {
        return Err(DecodeError::Truncated {
            needed: HEADER_PREFIX_LEN,
            available: buf.len(),
        });
    }

    let riff = tag(buf, 0);
    let overall_size = le_u32(buf, 4);
    let wave = tag(buf, 8);
    let fmt_chunk_marker = tag(buf, 12);
    let length_of_fmt = le_u32(buf, 16);
    let format_type = le_u16(buf, 20);
    let channels = le_u16(buf, 22);
    let sample_rate = le_u32(buf, 24);
    let byterate = le_u32(buf, 28);
    let block_align = le_u16(buf, 32);
    let bits_per_sample = le_u16(buf, 34);

    debug!("(1-4) RIFF marker: {}", tag_str(&riff));
    debug!(
        "(5-8) Overall size: bytes:{}, Kb:{}",
        overall_size,
        overall_size / 1024
    );
    debug!("(9-12) Wave marker: {}", tag_str(&wave));
    debug!("(13-16) Fmt marker: {}", tag_str(&fmt_chunk_marker));
    debug!("(17-20) Length of Fmt header: {}", length_of_fmt);
    debug!(
        "(21-22) Format type: {} {}",
        format_type,
        FormatType::from_code(format_type).name()
    );
    debug!("(23-24) Channels: {}", channels);
    debug!("(25-28) Sample rate: {}", sample_rate);
    debug!(
        "(29-32) Byte Rate: {}, Bit Rate: {}",
        byterate,
        byterate as u64 * 8
    );
    debug!("(33-34) Block Alignment: {}", block_align);
    debug!("(35-36) Bits per sample: {}", bits_per_sample);

    if &riff != b"RIFF" || &wave != b"WAVE" || &fmt_chunk_marker != b"fmt " {
        warn!(
            "Unexpected RIFF/WAVE tags: {:?} {:?} {:?}, decoding anyway",
            tag_str(&riff),
            tag_str(&wave),
            tag_str(&fmt_chunk_marker)
        );
    }

    let data_offset = find_offset(&buf[HEADER_PREFIX_LEN..], DATA_MARKER)
        .map(|rel| rel + HEADER_PREFIX_LEN)
        .ok_or(DecodeError::DataChunkNotFound)?;

    let size_end = data_offset + DATA_CHUNK_HEADER_LEN;
    if buf.len() < size_end {
        return Err(DecodeError::Truncated {
            needed: size_end,
            available: buf.len(),
        });
    }

    let data_chunk_header = tag(buf, data_offset);
    let data_size = le_u32(buf, data_offset + 4);
    debug!("Data marker at offset {}: {}", data_offset, tag_str(&data_chunk_header));
    debug!("Size of data chunk: {}", data_size);

    let num_samples = sample_count(data_size, channels, bits_per_sample)?;

    let header = WavHeader {
        riff,
        overall_size,
        wave,
        fmt_chunk_marker,
        length_of_fmt,
        format_type,
        channels,
        sample_rate,
        byterate,
        block_align,
        bits_per_sample,
        data_chunk_header,
        data_size,
        num_samples,
        data_offset,
    };

    if header.format() != FormatType::Pcm {
        warn!(
            "Format type {} ({}) is not PCM, output will not be meaningful",
            format_type,
            header.format().name()
        );
    }
    if bits_per_sample != 16 {
        warn!(
            "{} bits per sample; output ports expect 16-bit samples",
            bits_per_sample
        );
    }

    info!(
        "WAV header: {} channel(s), {} Hz, {} bits, {} samples",
        channels, sample_rate, bits_per_sample, num_samples
    );
    debug!("Size of each sample: {} bytes", header.frame_size());
    if let Some(duration) = header.approx_duration_secs() {
        debug!("Approx. duration in seconds: {:.3}", duration);
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_header(channels: u16, bits: u16, data_size: u32) -> Vec<u8> {
        let sample_rate = 44100u32;
        let block_align = channels * bits / 8;
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        buf.resize(buf.len() + data_size as usize, 0);
        buf
    }

    #[test]
    fn test_decode_stereo_16bit() {
        let buf = canonical_header(2, 16, 8);
        let header = decode_header(&buf).unwrap();

        assert_eq!(&header.riff, b"RIFF");
        assert_eq!(&header.wave, b"WAVE");
        assert_eq!(&header.fmt_chunk_marker, b"fmt ");
        assert_eq!(&header.data_chunk_header, b"data");
        assert_eq!(header.length_of_fmt, 16);
        assert_eq!(header.format(), FormatType::Pcm);
        assert_eq!(header.channels, 2);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.byterate, 176400);
        assert_eq!(header.block_align, 4);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_size, 8);
        assert_eq!(header.num_samples, 2);
        assert_eq!(header.data_offset, 36);
        assert_eq!(header.pcm_offset(), 44);
        assert_eq!(header.frame_size(), 4);
    }

    #[test]
    fn test_decode_finds_data_after_list_chunk() {
        let mut buf = canonical_header(1, 16, 4);
        let list: &[u8] = b"LIST\x04\x00\x00\x00INFO";
        for (i, byte) in list.iter().enumerate() {
            buf.insert(36 + i, *byte);
        }

        let header = decode_header(&buf).unwrap();
        assert_eq!(header.data_offset, 36 + list.len());
        assert_eq!(header.data_size, 4);
        assert_eq!(header.num_samples, 2);
    }

    #[test]
    fn test_decode_is_permissive_about_tags() {
        let mut buf = canonical_header(1, 8, 10);
        buf[0..4].copy_from_slice(b"RIFX");

        let header = decode_header(&buf).unwrap();
        assert_eq!(&header.riff, b"RIFX");
        assert_eq!(header.num_samples, 10);
    }

    #[test]
    fn test_zero_channels_rejected() {
        let buf = canonical_header(0, 16, 8);
        assert_eq!(
            decode_header(&buf),
            Err(DecodeError::InvalidChannelOrBitDepth {
                channels: 0,
                bits_per_sample: 16
            })
        );
    }

    #[test]
    fn test_zero_bits_rejected() {
        let buf = canonical_header(2, 0, 8);
        assert!(matches!(
            decode_header(&buf),
            Err(DecodeError::InvalidChannelOrBitDepth { .. })
        ));
    }

    #[test]
    fn test_three_channels_decode() {
        // Layout is the engine's concern, not the decoder's.
        let buf = canonical_header(3, 16, 12);
        let header = decode_header(&buf).unwrap();
        assert_eq!(header.channels, 3);
        assert_eq!(header.num_samples, 2);
    }

    #[test]
    fn test_truncated_prefix() {
        let buf = canonical_header(2, 16, 0);
        assert_eq!(
            decode_header(&buf[..20]),
            Err(DecodeError::Truncated {
                needed: 36,
                available: 20
            })
        );
    }

    #[test]
    fn test_truncated_size_field() {
        let buf = canonical_header(2, 16, 0);
        assert_eq!(
            decode_header(&buf[..42]),
            Err(DecodeError::Truncated {
                needed: 44,
                available: 42
            })
        );
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut buf = canonical_header(2, 16, 0);
        buf[36..40].copy_from_slice(b"junk");
        assert_eq!(decode_header(&buf), Err(DecodeError::DataChunkNotFound));
    }

    #[test]
    fn test_sample_count_floor_division() {
        assert_eq!(sample_count(8, 2, 16).unwrap(), 2);
        assert_eq!(sample_count(7, 2, 16).unwrap(), 1);
        assert_eq!(sample_count(3, 1, 8).unwrap(), 3);
        assert_eq!(sample_count(5, 1, 24).unwrap(), 1);
    }

    #[test]
    fn test_sample_count_does_not_overflow() {
        assert_eq!(
            sample_count(u32::MAX, 1, 8).unwrap(),
            u32::MAX as u64
        );
    }

    #[test]
    fn test_format_names() {
        assert_eq!(FormatType::from_code(1).name(), "PCM");
        assert_eq!(FormatType::from_code(6).name(), "A-law");
        assert_eq!(FormatType::from_code(7).name(), "Mu-law");
        assert_eq!(FormatType::from_code(0x55), FormatType::Unknown(0x55));
    }

    #[test]
    fn test_duration_guarded_against_zero_byterate() {
        let mut buf = canonical_header(2, 16, 8);
        buf[28..32].copy_from_slice(&0u32.to_le_bytes());
        let header = decode_header(&buf).unwrap();
        assert_eq!(header.approx_duration_secs(), None);
    }
}
