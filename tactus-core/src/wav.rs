//! RIFF/WAVE header decoding
//!
//! Only the fixed-size pieces are decoded here; walking the chunk list needs
//! file access and lives in the audio engine.
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  container size (LE)
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  fmt body size (LE, >= 16)
//!     20     2  audio format (1 = PCM)
//!     22     2  channels
//!     24     4  sample rate
//!     28     4  byte rate
//!     32     2  block align
//!     34     2  bits per sample
//!     36     4  next chunk id ("data" in canonical files)
//!     40     4  next chunk size
//! ```

use crate::error::ProtocolError;

pub const RIFF_HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;
pub const FMT_BODY_LEN: usize = 16;

pub const FORMAT_PCM: u16 = 1;
pub const REQUIRED_CHANNELS: u16 = 2;
pub const REQUIRED_BITS: u16 = 16;

pub const RIFF_ID: [u8; 4] = *b"RIFF";
pub const WAVE_ID: [u8; 4] = *b"WAVE";
pub const FMT_ID: [u8; 4] = *b"fmt ";
pub const DATA_ID: [u8; 4] = *b"data";

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Check the 12-byte container header and return the declared RIFF size
pub fn parse_riff_header(bytes: &[u8; RIFF_HEADER_LEN]) -> Result<u32, ProtocolError> {
    if bytes[0..4] != RIFF_ID || bytes[8..12] != WAVE_ID {
        return Err(ProtocolError::MalformedContainer);
    }
    Ok(le_u32(bytes, 4))
}

/// Tag and declared body size of one RIFF sub-chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    pub fn parse(bytes: &[u8; CHUNK_HEADER_LEN]) -> Self {
        Self {
            id: [bytes[0], bytes[1], bytes[2], bytes[3]],
            size: le_u32(bytes, 4),
        }
    }

    pub fn is_data(&self) -> bool {
        self.id == DATA_ID
    }

    pub fn is_fmt(&self) -> bool {
        self.id == FMT_ID
    }

    /// Bytes to skip to reach the next chunk header (bodies are word aligned)
    pub fn skip_len(&self) -> u32 {
        self.size.saturating_add(self.size & 1)
    }
}

/// Decoded "fmt " chunk body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    pub fn parse(bytes: &[u8; FMT_BODY_LEN]) -> Self {
        Self {
            audio_format: le_u16(bytes, 0),
            channels: le_u16(bytes, 2),
            sample_rate: le_u32(bytes, 4),
            byte_rate: le_u32(bytes, 8),
            block_align: le_u16(bytes, 12),
            bits_per_sample: le_u16(bytes, 14),
        }
    }

    /// Accept only stereo 16-bit linear PCM at the output rate
    pub fn validate(&self, output_rate: u32) -> Result<(), ProtocolError> {
        if self.audio_format != FORMAT_PCM
            || self.channels != REQUIRED_CHANNELS
            || self.bits_per_sample != REQUIRED_BITS
            || self.sample_rate != output_rate
        {
            return Err(ProtocolError::UnsupportedFormat);
        }
        Ok(())
    }

    /// Bytes per interleaved frame
    pub fn frame_len(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }
}

/// Everything the engine needs to start streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    pub format: WavFormat,
    /// Declared payload size of the "data" chunk
    pub data_size: u32,
}
