//! Opus encoder session.

use std::os::raw::c_int;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::config::{self, EncoderSettings, APPLICATION, BYTES_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use crate::error::{alloc_zeroed, check, Error, Result};
use crate::ffi::{self, OpusEncoder as OpusEncoderHandle};
use crate::pcm;

/// Opus encoder session: 48 kHz, stereo, VoIP application.
///
/// Owns one native encoder, released when the session is dropped. A dropped
/// session cannot be used again:
///
/// ```compile_fail
/// use giztoy_opus::Encoder;
///
/// let mut encoder = Encoder::new().unwrap();
/// drop(encoder);
/// encoder.set_bitrate(32000).unwrap();
/// ```
pub struct Encoder {
    handle: NonNull<OpusEncoderHandle>,
}

// Safety: the handle is owned exclusively and only touched through &mut self.
unsafe impl Send for Encoder {}

impl Drop for Encoder {
    fn drop(&mut self) {
        unsafe { ffi::opus_encoder_destroy(self.handle.as_ptr()) };
        debug!("opus encoder destroyed");
    }
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("sample_rate", &SAMPLE_RATE)
            .field("channels", &CHANNELS)
            .finish()
    }
}

impl Encoder {
    /// Creates a new encoder.
    pub fn new() -> Result<Self> {
        let mut error: c_int = ffi::OPUS_OK;
        let handle = unsafe {
            ffi::opus_encoder_create(SAMPLE_RATE, CHANNELS, APPLICATION.to_ffi(), &mut error)
        };

        if error != ffi::OPUS_OK {
            if !handle.is_null() {
                unsafe { ffi::opus_encoder_destroy(handle) };
            }
            return Err(Error::from_code(error));
        }
        let handle = NonNull::new(handle).ok_or(Error::AllocationFailure)?;

        debug!("opus encoder created ({} Hz, {} channels, {:?})", SAMPLE_RATE, CHANNELS, APPLICATION);
        Ok(Self { handle })
    }

    /// Creates a new encoder with `settings` applied.
    pub fn with_settings(settings: &EncoderSettings) -> Result<Self> {
        let mut encoder = Self::new()?;
        settings.apply(&mut encoder)?;
        Ok(encoder)
    }

    /// Encodes raw PCM bytes to one Opus packet.
    ///
    /// # Parameters
    /// - `pcm`: interleaved s16le samples, exactly `frame_size * CHANNELS` of them
    /// - `frame_size`: samples per channel (120, 240, 480, 960, 1920 or 2880)
    pub fn encode(&mut self, pcm: &[u8], frame_size: i32) -> Result<Vec<u8>> {
        if !config::is_valid_frame_size(frame_size) || pcm.len() != config::pcm_len(frame_size) {
            return Err(Error::BadArgument);
        }
        let samples = pcm::bytes_to_samples(pcm)?;
        self.encode_samples(&samples, frame_size)
    }

    /// Encodes interleaved samples to one Opus packet.
    pub fn encode_samples(&mut self, pcm: &[i16], frame_size: i32) -> Result<Vec<u8>> {
        if !config::is_valid_frame_size(frame_size)
            || pcm.len() != frame_size as usize * CHANNELS as usize
        {
            return Err(Error::BadArgument);
        }

        // The input size bounds the packet size for this configuration.
        let capacity = pcm.len() * BYTES_PER_SAMPLE;
        let mut buf = alloc_zeroed::<u8>(capacity)?;

        let n = unsafe {
            ffi::opus_encode(
                self.handle.as_ptr(),
                pcm.as_ptr(),
                frame_size,
                buf.as_mut_ptr(),
                i32::try_from(capacity).unwrap_or(i32::MAX),
            )
        };
        let n = check(n)?;

        trace!("encoded {} samples into {} bytes", frame_size, n);
        buf.truncate(n);
        Ok(buf)
    }

    /// Sets the target bitrate in bits per second.
    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<()> {
        self.ctl(ffi::OPUS_SET_BITRATE_REQUEST, bitrate)?;
        debug!("opus encoder bitrate set to {}", bitrate);
        Ok(())
    }

    /// Enables or disables in-band forward error correction.
    pub fn set_fec(&mut self, enabled: bool) -> Result<()> {
        self.ctl(ffi::OPUS_SET_INBAND_FEC_REQUEST, enabled as c_int)?;
        debug!("opus encoder fec set to {}", enabled);
        Ok(())
    }

    /// Sets the expected packet loss percentage (0-100).
    ///
    /// Values outside the range are rejected with [`Error::BadArgument`].
    pub fn set_expected_packet_loss(&mut self, percent: i32) -> Result<()> {
        if !(0..=100).contains(&percent) {
            return Err(Error::BadArgument);
        }
        self.ctl(ffi::OPUS_SET_PACKET_LOSS_PERC_REQUEST, percent)?;
        debug!("opus encoder expected packet loss set to {}%", percent);
        Ok(())
    }

    fn ctl(&mut self, request: c_int, value: c_int) -> Result<()> {
        let ret = unsafe { ffi::opus_encoder_ctl(self.handle.as_ptr(), request, value) };
        check(ret).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::FrameDuration;

    fn sine(frame_size: usize) -> Vec<i16> {
        let mut pcm = Vec::with_capacity(frame_size * 2);
        for i in 0..frame_size {
            let sample = ((i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 48000.0).sin()
                * 10000.0) as i16;
            pcm.push(sample);
            pcm.push(sample);
        }
        pcm
    }

    #[test]
    fn test_encoder_create() {
        let encoder = Encoder::new();
        assert!(encoder.is_ok());
    }

    #[test]
    fn test_encode_silence() {
        let mut encoder = Encoder::new().unwrap();
        let pcm = vec![0u8; 960 * 4];
        let packet = encoder.encode(&pcm, 960).unwrap();
        assert!(!packet.is_empty());
        assert!(packet.len() <= pcm.len());
    }

    #[test]
    fn test_encode_samples_sine() {
        let mut encoder = Encoder::new().unwrap();
        let packet = encoder.encode_samples(&sine(960), 960).unwrap();
        assert!(!packet.is_empty());
    }

    #[test]
    fn test_encode_every_frame_duration() {
        let mut encoder = Encoder::new().unwrap();
        for fd in FrameDuration::ALL {
            let frame_size = config::frame_size_for(fd);
            let pcm = sine(frame_size as usize);
            let packet = encoder.encode_samples(&pcm, frame_size).unwrap();
            assert!(!packet.is_empty(), "{fd}");
            assert!(packet.len() <= pcm.len() * 2, "{fd}");
        }
    }

    #[test]
    fn test_encode_bad_frame_size() {
        let mut encoder = Encoder::new().unwrap();
        assert_eq!(encoder.encode(&[], 0), Err(Error::BadArgument));
        assert_eq!(encoder.encode(&[0u8; 3840], -960), Err(Error::BadArgument));
        assert_eq!(encoder.encode(&[0u8; 4000], 1000), Err(Error::BadArgument));
    }

    #[test]
    fn test_encode_length_mismatch() {
        let mut encoder = Encoder::new().unwrap();
        // One stereo frame short.
        assert_eq!(encoder.encode(&[0u8; 3836], 960), Err(Error::BadArgument));
        // Misaligned.
        assert_eq!(encoder.encode(&[0u8; 3841], 960), Err(Error::BadArgument));
        assert_eq!(encoder.encode_samples(&[0i16; 960], 960), Err(Error::BadArgument));
    }

    #[test]
    fn test_set_bitrate() {
        let mut encoder = Encoder::new().unwrap();
        assert!(encoder.set_bitrate(32000).is_ok());
    }

    #[test]
    fn test_set_fec() {
        let mut encoder = Encoder::new().unwrap();
        assert!(encoder.set_fec(true).is_ok());
        assert!(encoder.set_fec(false).is_ok());
    }

    #[test]
    fn test_set_expected_packet_loss() {
        let mut encoder = Encoder::new().unwrap();
        assert!(encoder.set_expected_packet_loss(0).is_ok());
        assert!(encoder.set_expected_packet_loss(15).is_ok());
        assert!(encoder.set_expected_packet_loss(100).is_ok());
    }

    #[test]
    fn test_set_expected_packet_loss_out_of_range() {
        let mut encoder = Encoder::new().unwrap();
        assert_eq!(encoder.set_expected_packet_loss(-1), Err(Error::BadArgument));
        assert_eq!(encoder.set_expected_packet_loss(101), Err(Error::BadArgument));
    }

    #[test]
    fn test_with_settings() {
        let settings = EncoderSettings {
            bitrate: Some(24000),
            fec: true,
            packet_loss_percent: 5,
        };
        let mut encoder = Encoder::with_settings(&settings).unwrap();
        assert!(encoder.encode_samples(&sine(960), 960).is_ok());
    }

    #[test]
    fn test_with_settings_invalid() {
        let settings = EncoderSettings {
            packet_loss_percent: 250,
            ..Default::default()
        };
        assert_eq!(Encoder::with_settings(&settings).err(), Some(Error::BadArgument));
    }

    #[test]
    fn test_encoder_multiple_frames() {
        let mut encoder = Encoder::new().unwrap();
        let pcm = sine(960);
        for _ in 0..10 {
            assert!(encoder.encode_samples(&pcm, 960).is_ok());
        }
    }
}
