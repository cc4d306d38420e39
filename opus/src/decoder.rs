//! Opus decoder session.

use std::os::raw::c_int;
use std::ptr::{self, NonNull};

use tracing::{debug, trace};

use crate::config::{BYTES_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use crate::error::{alloc_zeroed, check, Error, Result};
use crate::ffi::{self, OpusDecoder as OpusDecoderHandle};
use crate::packet;
use crate::pcm;

/// Opus decoder session: 48 kHz, stereo.
///
/// Owns one native decoder, released when the session is dropped.
pub struct Decoder {
    handle: NonNull<OpusDecoderHandle>,
    decoded_any: bool,
}

// Safety: the handle is owned exclusively and only touched through &mut self.
unsafe impl Send for Decoder {}

impl Drop for Decoder {
    fn drop(&mut self) {
        unsafe { ffi::opus_decoder_destroy(self.handle.as_ptr()) };
        debug!("opus decoder destroyed");
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("sample_rate", &SAMPLE_RATE)
            .field("channels", &CHANNELS)
            .field("decoded_any", &self.decoded_any)
            .finish()
    }
}

impl Decoder {
    /// Creates a new decoder.
    pub fn new() -> Result<Self> {
        let mut error: c_int = ffi::OPUS_OK;
        let handle = unsafe { ffi::opus_decoder_create(SAMPLE_RATE, CHANNELS, &mut error) };

        if error != ffi::OPUS_OK {
            if !handle.is_null() {
                unsafe { ffi::opus_decoder_destroy(handle) };
            }
            return Err(Error::from_code(error));
        }
        let handle = NonNull::new(handle).ok_or(Error::AllocationFailure)?;

        debug!("opus decoder created ({} Hz, {} channels)", SAMPLE_RATE, CHANNELS);
        Ok(Self {
            handle,
            decoded_any: false,
        })
    }

    /// Decodes one packet to raw PCM bytes (interleaved s16le).
    ///
    /// # Parameters
    /// - `packet`: encoded packet; empty requests packet loss concealment
    /// - `frame_size`: maximum samples per channel to decode; values above
    ///   120 ms are capped, since no packet decodes to more
    /// - `channels`: must be [`CHANNELS`]
    /// - `decode_fec`: recover the previous, lost packet from this packet's
    ///   in-band FEC data instead of decoding this packet
    ///
    /// Returns exactly the decoded length: `samples * channels * 2` bytes.
    pub fn decode(
        &mut self,
        packet: &[u8],
        frame_size: i32,
        channels: i32,
        decode_fec: bool,
    ) -> Result<Vec<u8>> {
        let samples = self.decode_samples(packet, frame_size, channels, decode_fec)?;
        pcm::samples_to_bytes(&samples)
    }

    /// Decodes one packet to interleaved samples.
    ///
    /// Same parameters as [`Decoder::decode`].
    pub fn decode_samples(
        &mut self,
        packet: &[u8],
        frame_size: i32,
        channels: i32,
        decode_fec: bool,
    ) -> Result<Vec<i16>> {
        if frame_size <= 0 || channels != CHANNELS {
            return Err(Error::BadArgument);
        }
        let len = i32::try_from(packet.len()).map_err(|_| Error::BadArgument)?;

        // libopus never produces more than one maximal packet per call.
        let frame_size = frame_size.min(packet::MAX_PACKET_SAMPLES as i32);
        let mut buf = alloc_zeroed::<i16>(frame_size as usize * channels as usize)?;
        let data = if packet.is_empty() {
            ptr::null()
        } else {
            packet.as_ptr()
        };

        let n = unsafe {
            ffi::opus_decode(
                self.handle.as_ptr(),
                data,
                len,
                buf.as_mut_ptr(),
                frame_size,
                decode_fec as c_int,
            )
        };
        let n = check(n)?;
        self.decoded_any = true;

        trace!(
            "decoded {} bytes into {} samples ({} bytes of pcm)",
            packet.len(),
            n,
            n * channels as usize * BYTES_PER_SAMPLE
        );
        buf.truncate(n * channels as usize);
        Ok(buf)
    }

    /// Decodes a packet with the output sized from its own header.
    pub fn decode_packet(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        let frame_size = packet::sample_count(packet)?;
        self.decode(packet, frame_size as i32, CHANNELS, false)
    }

    /// Returns the duration in samples per channel of the last decoded packet.
    ///
    /// Returns 0 if nothing has been decoded yet.
    pub fn last_packet_duration(&mut self) -> Result<i32> {
        if !self.decoded_any {
            return Ok(0);
        }
        let mut duration: c_int = 0;
        let ret = unsafe {
            ffi::opus_decoder_ctl(
                self.handle.as_ptr(),
                ffi::OPUS_GET_LAST_PACKET_DURATION_REQUEST,
                &mut duration as *mut c_int,
            )
        };
        check(ret)?;
        Ok(duration)
    }
}
