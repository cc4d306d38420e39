//! Codec configuration.
//!
//! The sample rate, channel count and application are fixed for every
//! session. Only encoder tunables can be configured, through
//! [`EncoderSettings`].

use serde::{Deserialize, Serialize};

use crate::encoder::Encoder;
use crate::error::Result;
use crate::ffi;
use crate::packet::FrameDuration;

/// Sample rate of every session, in Hz.
pub const SAMPLE_RATE: i32 = 48000;

/// Channel count of every session. PCM is interleaved.
pub const CHANNELS: i32 = 2;

/// Bytes per PCM sample (signed 16-bit).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Bytes per interleaved PCM frame (one sample for every channel).
pub const BYTES_PER_FRAME: usize = CHANNELS as usize * BYTES_PER_SAMPLE;

/// Encoder application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// Best quality for voice signals at low latency.
    Voip,
}

impl Application {
    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::Voip => ffi::OPUS_APPLICATION_VOIP,
        }
    }
}

/// Application mode of every encoder.
pub const APPLICATION: Application = Application::Voip;

/// Returns the frame size (samples per channel) for a duration at 48 kHz.
pub fn frame_size_for(fd: FrameDuration) -> i32 {
    fd.samples() as i32
}

/// Returns true if `frame_size` is one of the sizes Opus accepts at 48 kHz.
pub fn is_valid_frame_size(frame_size: i32) -> bool {
    frame_size > 0 && FrameDuration::from_samples(frame_size as usize).is_some()
}

/// Returns the PCM byte length of one frame of `frame_size` samples per channel.
pub fn pcm_len(frame_size: i32) -> usize {
    frame_size.max(0) as usize * BYTES_PER_FRAME
}

/// Encoder tunables.
///
/// Deserializable from YAML or JSON:
///
/// ```yaml
/// bitrate: 64000
/// fec: true
/// packet_loss_percent: 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Target bitrate in bits per second. `None` keeps the libopus default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i32>,

    /// In-band forward error correction.
    pub fec: bool,

    /// Expected packet loss, 0 to 100.
    pub packet_loss_percent: i32,
}

impl EncoderSettings {
    /// Applies every tunable to `encoder`, stopping at the first failure.
    pub fn apply(&self, encoder: &mut Encoder) -> Result<()> {
        if let Some(bitrate) = self.bitrate {
            encoder.set_bitrate(bitrate)?;
        }
        encoder.set_fec(self.fec)?;
        encoder.set_expected_packet_loss(self.packet_loss_percent)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_for() {
        assert_eq!(frame_size_for(FrameDuration::Ms2_5), 120);
        assert_eq!(frame_size_for(FrameDuration::Ms20), 960);
        assert_eq!(frame_size_for(FrameDuration::Ms60), 2880);
    }

    #[test]
    fn test_is_valid_frame_size() {
        for fs in [120, 240, 480, 960, 1920, 2880] {
            assert!(is_valid_frame_size(fs), "{fs}");
        }
        for fs in [-960, -1, 0, 1, 100, 959, 5760] {
            assert!(!is_valid_frame_size(fs), "{fs}");
        }
    }

    #[test]
    fn test_pcm_len() {
        assert_eq!(pcm_len(960), 3840);
        assert_eq!(pcm_len(-1), 0);
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = "bitrate: 64000\nfec: true\npacket_loss_percent: 10\n";
        let settings: EncoderSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.bitrate, Some(64000));
        assert!(settings.fec);
        assert_eq!(settings.packet_loss_percent, 10);
    }

    #[test]
    fn test_settings_defaults() {
        let settings: EncoderSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, EncoderSettings::default());
        assert_eq!(settings.bitrate, None);
        assert!(!settings.fec);
        assert_eq!(settings.packet_loss_percent, 0);
    }

    #[test]
    fn test_settings_serialize_skips_bitrate() {
        let json = serde_json::to_string(&EncoderSettings::default()).unwrap();
        assert!(!json.contains("bitrate"));
    }
}
