//! WAV header decoding against hand-built and encoder-written files

mod helpers;

use bootsound::audio::wav::{decode_header, sample_count};
use bootsound::audio::scan::find_offset;
use bootsound::error::DecodeError;
use helpers::{canonical_wav, generate_sine_wav, with_list_chunk};
use tempfile::TempDir;

#[test]
fn test_reference_stereo_header() {
    // RIFF????WAVEfmt  + 16,1,2,44100,176400,4,16 + data + size 8
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF????WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&44100u32.to_le_bytes());
    bytes.extend_from_slice(&176400u32.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);

    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.channels, 2);
    assert_eq!(header.bits_per_sample, 16);
    assert_eq!(header.num_samples, 2);
    assert_eq!(header.sample_rate, 44100);
    assert_eq!(header.overall_size, u32::from_le_bytes(*b"????"));
}

#[test]
fn test_scanner_reference_example() {
    assert_eq!(find_offset(b"XXXXdataYYYY", b"data"), Some(4));
}

#[test]
fn test_num_samples_matches_formula() {
    for (channels, bits) in [(1u16, 8u16), (1, 16), (2, 8), (2, 16), (2, 24)] {
        for data_size in [0u32, 1, 7, 100, 4095, 65536] {
            let wav = canonical_wav(channels, bits, 22050, &vec![0u8; data_size as usize]);
            let header = decode_header(&wav).unwrap();
            let expected = 8 * data_size as u64 / (channels as u64 * bits as u64);
            assert_eq!(header.num_samples, expected, "{channels}ch {bits}bit {data_size}B");
            assert_eq!(sample_count(data_size, channels, bits).unwrap(), expected);
        }
    }
}

#[test]
fn test_list_chunk_before_data() {
    let wav = canonical_wav(1, 16, 16000, &[0u8; 32]);
    let wav = with_list_chunk(&wav, b"INFOISFT\x06\x00\x00\x00Lavf\x00\x00");

    let header = decode_header(&wav).unwrap();

    assert_eq!(header.data_offset, 36 + 8 + 18);
    assert_eq!(header.data_size, 32);
    assert_eq!(header.num_samples, 16);
}

#[test]
fn test_hound_written_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sine.wav");
    generate_sine_wav(&path, 2, 48000, 1000, 440.0).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let header = decode_header(&bytes).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(header.channels, spec.channels);
    assert_eq!(header.sample_rate, spec.sample_rate);
    assert_eq!(header.bits_per_sample, spec.bits_per_sample);
    assert_eq!(header.num_samples, reader.duration() as u64);
    assert_eq!(header.pcm_offset() + header.data_size as usize, bytes.len());
}

#[test]
fn test_zero_bit_depth_is_rejected() {
    let wav = canonical_wav(2, 0, 44100, &[0u8; 16]);
    assert_eq!(
        decode_header(&wav),
        Err(DecodeError::InvalidChannelOrBitDepth {
            channels: 2,
            bits_per_sample: 0
        })
    );
}

#[test]
fn test_header_only_file_without_data_marker() {
    let wav = canonical_wav(2, 16, 44100, &[]);
    assert_eq!(
        decode_header(&wav[..36]),
        Err(DecodeError::DataChunkNotFound)
    );
}
