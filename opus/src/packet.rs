//! Packet inspection without decoding.
//!
//! Reads the TOC (table of contents) byte, and for code 3 packets the frame
//! count byte, as laid out in RFC 6716 Section 3.1. None of these functions
//! need an encoder or decoder session.
//!
//! ```text
//!          0 1 2 3 4 5 6 7
//!         +-+-+-+-+-+-+-+-+
//!         | config  |s| c |
//!         +-+-+-+-+-+-+-+-+
//! ```

use std::time::Duration;

use crate::config::SAMPLE_RATE;
use crate::error::{Error, Result};

/// Longest audio duration a single packet may carry, in 48 kHz samples (120 ms).
pub const MAX_PACKET_SAMPLES: usize = 5760;

/// TOC byte from an Opus packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TOC(pub u8);

impl TOC {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Reads the TOC byte of a packet.
    pub fn parse(packet: &[u8]) -> Result<Self> {
        match packet.first() {
            Some(&byte) => Ok(Self(byte)),
            None => Err(Error::InvalidPacket),
        }
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> Configuration {
        Configuration(self.0 >> 3)
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b0000_0100) != 0
    }

    /// Returns the frame code (number of frames per packet).
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b0000_0011)
    }
}

impl std::fmt::Display for TOC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.configuration();
        write!(
            f,
            "opus_toc: config={}, stereo={}, mode={}, bw={}, {}, {}",
            config.0,
            self.is_stereo(),
            config.mode(),
            config.bandwidth(),
            self.frame_code(),
            config.frame_duration(),
        )
    }
}

/// Opus configuration number (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration(pub u8);

impl Configuration {
    /// Returns the coding mode.
    pub fn mode(&self) -> Mode {
        match self.0 & 0x1f {
            0..=11 => Mode::Silk,
            12..=15 => Mode::Hybrid,
            _ => Mode::Celt,
        }
    }

    /// Returns the audio bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        match self.0 & 0x1f {
            0..=3 => Bandwidth::Narrow,
            4..=7 => Bandwidth::Medium,
            8..=11 => Bandwidth::Wide,
            12..=13 => Bandwidth::SuperWide,
            14..=15 => Bandwidth::Full,
            16..=19 => Bandwidth::Narrow,
            20..=23 => Bandwidth::Wide,
            24..=27 => Bandwidth::SuperWide,
            _ => Bandwidth::Full,
        }
    }

    /// Returns the duration of each frame.
    pub fn frame_duration(&self) -> FrameDuration {
        let config = self.0 & 0x1f;
        match config {
            // SILK: four durations per bandwidth, starting at 10 ms.
            0..=11 => match config % 4 {
                0 => FrameDuration::Ms10,
                1 => FrameDuration::Ms20,
                2 => FrameDuration::Ms40,
                _ => FrameDuration::Ms60,
            },
            // Hybrid: two durations per bandwidth.
            12..=15 => {
                if config % 2 == 0 {
                    FrameDuration::Ms10
                } else {
                    FrameDuration::Ms20
                }
            }
            // CELT: four durations per bandwidth, starting at 2.5 ms.
            _ => match config % 4 {
                0 => FrameDuration::Ms2_5,
                1 => FrameDuration::Ms5,
                2 => FrameDuration::Ms10,
                _ => FrameDuration::Ms20,
            },
        }
    }
}

/// Coding mode selected by the configuration number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Silk,
    Hybrid,
    Celt,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silk => write!(f, "SILK"),
            Self::Hybrid => write!(f, "Hybrid"),
            Self::Celt => write!(f, "CELT"),
        }
    }
}

/// Audio bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// 4 kHz audio bandwidth
    Narrow,
    /// 6 kHz audio bandwidth
    Medium,
    /// 8 kHz audio bandwidth
    Wide,
    /// 12 kHz audio bandwidth
    SuperWide,
    /// 20 kHz audio bandwidth
    Full,
}

impl Bandwidth {
    /// Returns the effective sample rate for this bandwidth.
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Narrow => 8000,
            Self::Medium => 12000,
            Self::Wide => 16000,
            Self::SuperWide => 24000,
            Self::Full => 48000,
        }
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Narrow => write!(f, "Narrowband"),
            Self::Medium => write!(f, "Mediumband"),
            Self::Wide => write!(f, "Wideband"),
            Self::SuperWide => write!(f, "Superwideband"),
            Self::Full => write!(f, "Fullband"),
        }
    }
}

/// Frame code: how many frames the packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// Code 0: one frame.
    One,
    /// Code 1: two frames of equal compressed size.
    TwoEqual,
    /// Code 2: two frames of different compressed size.
    TwoDifferent,
    /// Code 3: frame count given in the second byte.
    Arbitrary,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::One,
            1 => Self::TwoEqual,
            2 => Self::TwoDifferent,
            _ => Self::Arbitrary,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One => write!(f, "code 0 (one frame)"),
            Self::TwoEqual => write!(f, "code 1 (two equal frames)"),
            Self::TwoDifferent => write!(f, "code 2 (two different frames)"),
            Self::Arbitrary => write!(f, "code 3 (arbitrary frames)"),
        }
    }
}

/// Frame durations supported by Opus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameDuration {
    Ms2_5,
    Ms5,
    Ms10,
    Ms20,
    Ms40,
    Ms60,
}

impl FrameDuration {
    /// All durations, shortest first.
    pub const ALL: [FrameDuration; 6] = [
        Self::Ms2_5,
        Self::Ms5,
        Self::Ms10,
        Self::Ms20,
        Self::Ms40,
        Self::Ms60,
    ];

    /// Returns the duration in microseconds.
    pub fn micros(&self) -> u64 {
        match self {
            Self::Ms2_5 => 2_500,
            Self::Ms5 => 5_000,
            Self::Ms10 => 10_000,
            Self::Ms20 => 20_000,
            Self::Ms40 => 40_000,
            Self::Ms60 => 60_000,
        }
    }

    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.micros())
    }

    /// Returns the number of samples per channel at 48 kHz.
    pub fn samples(&self) -> usize {
        (SAMPLE_RATE as u64 * self.micros() / 1_000_000) as usize
    }

    /// Finds the duration whose 48 kHz sample count is `samples`.
    pub fn from_samples(samples: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|fd| fd.samples() == samples)
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ms2_5 => write!(f, "2.5ms"),
            Self::Ms5 => write!(f, "5ms"),
            Self::Ms10 => write!(f, "10ms"),
            Self::Ms20 => write!(f, "20ms"),
            Self::Ms40 => write!(f, "40ms"),
            Self::Ms60 => write!(f, "60ms"),
        }
    }
}

/// Returns the number of frames in the packet.
pub fn frame_count(packet: &[u8]) -> Result<usize> {
    let toc = TOC::parse(packet)?;
    match toc.frame_code() {
        FrameCode::One => Ok(1),
        FrameCode::TwoEqual | FrameCode::TwoDifferent => Ok(2),
        FrameCode::Arbitrary => {
            let byte = packet.get(1).ok_or(Error::InvalidPacket)?;
            match (byte & 0b0011_1111) as usize {
                0 => Err(Error::InvalidPacket),
                n => Ok(n),
            }
        }
    }
}

/// Returns the channel count signalled in the TOC (1 or 2).
pub fn channel_count(packet: &[u8]) -> Result<usize> {
    let toc = TOC::parse(packet)?;
    Ok(if toc.is_stereo() { 2 } else { 1 })
}

/// Returns the number of samples per frame per channel at 48 kHz.
pub fn samples_per_frame(packet: &[u8]) -> Result<usize> {
    let toc = TOC::parse(packet)?;
    Ok(toc.configuration().frame_duration().samples())
}

/// Returns the total number of samples per channel at 48 kHz.
///
/// Packets claiming more than 120 ms of audio are rejected.
pub fn sample_count(packet: &[u8]) -> Result<usize> {
    let samples = frame_count(packet)? * samples_per_frame(packet)?;
    if samples > MAX_PACKET_SAMPLES {
        return Err(Error::InvalidPacket);
    }
    Ok(samples)
}
