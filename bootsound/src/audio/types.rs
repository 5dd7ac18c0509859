//! Core audio data types shared by the decoder, engine and output ports

/// Channel layout accepted by an audio output port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Map a WAV channel count onto a port layout
    ///
    /// Returns `None` for anything other than 1 or 2 channels.
    pub fn from_channels(channels: u16) -> Option<Self> {
        match channels {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }

    /// Number of interleaved channels in this layout
    pub fn channel_count(self) -> u16 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

/// Integer PCM sample width as stored in the WAV data chunk
///
/// 8-bit samples are unsigned with a 128 midpoint; wider samples are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    U8,
    S16,
    S24,
    S32,
}

impl SampleWidth {
    /// Map `bits_per_sample` onto a width, `None` for anything unplayable
    pub fn from_bits(bits_per_sample: u16) -> Option<Self> {
        match bits_per_sample {
            8 => Some(SampleWidth::U8),
            16 => Some(SampleWidth::S16),
            24 => Some(SampleWidth::S24),
            32 => Some(SampleWidth::S32),
            _ => None,
        }
    }

    /// Bytes per sample
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::S16 => 2,
            SampleWidth::S24 => 3,
            SampleWidth::S32 => 4,
        }
    }

    /// Convert one little-endian sample to 16-bit signed, keeping the top bits
    ///
    /// `sample` must be exactly [`bytes`](Self::bytes) long.
    pub fn to_i16(self, sample: &[u8]) -> i16 {
        match (self, sample) {
            (SampleWidth::U8, [b]) => ((*b as i16) - 128) << 8,
            (SampleWidth::S16, [lo, hi]) => i16::from_le_bytes([*lo, *hi]),
            (SampleWidth::S24, [_, mid, hi]) => i16::from_le_bytes([*mid, *hi]),
            (SampleWidth::S32, [_, _, mid, hi]) => i16::from_le_bytes([*mid, *hi]),
            _ => 0,
        }
    }
}

/// Parameters for opening one output port
///
/// A port plays exactly `sample_len` frames per submitted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortParams {
    /// Frames per block
    pub sample_len: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub layout: ChannelLayout,
    pub width: SampleWidth,
}

impl PortParams {
    /// Size in bytes of one submitted block for these parameters
    pub fn block_bytes(&self) -> usize {
        self.sample_len as usize * self.layout.channel_count() as usize * self.width.bytes()
    }
}

/// Handle to an open output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(pub u32);
