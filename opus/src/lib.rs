//! Opus encoder and decoder sessions over libopus.
//!
//! This crate provides:
//!
//! - [`Encoder`] / [`Decoder`]: stateful sessions, each owning one native
//!   libopus handle for its whole lifetime
//! - [`packet`]: stateless packet header inspection (frame count, channel
//!   count, samples per frame)
//! - [`Error`]: the libopus status codes as a Rust error type
//!
//! Every session runs at 48 kHz, stereo, with the VoIP application. PCM is
//! interleaved signed 16-bit little-endian.
//!
//! # Example
//!
//! ```no_run
//! use giztoy_opus::{packet, Decoder, Encoder};
//!
//! let mut encoder = Encoder::new()?;
//! encoder.set_bitrate(64000)?;
//! encoder.set_fec(true)?;
//!
//! // 20ms of stereo silence at 48kHz
//! let pcm = vec![0u8; 960 * 2 * 2];
//! let frame = encoder.encode(&pcm, 960)?;
//!
//! let frame_size = packet::frame_count(&frame)? * packet::samples_per_frame(&frame)?;
//! let mut decoder = Decoder::new()?;
//! let decoded = decoder.decode(&frame, frame_size as i32, 2, false)?;
//! assert_eq!(decoded.len(), pcm.len());
//! # Ok::<(), giztoy_opus::Error>(())
//! ```
//!
//! # Linking
//!
//! libopus is linked dynamically. `build.rs` locates it with pkg-config.

pub mod config;
mod decoder;
mod encoder;
mod error;
mod ffi;
pub mod packet;
pub mod pcm;
#[cfg(feature = "tokio")]
mod shared;

pub use config::{EncoderSettings, CHANNELS, SAMPLE_RATE};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{error_string, Error, Result};
pub use packet::FrameDuration;
#[cfg(feature = "tokio")]
pub use shared::{SharedDecoder, SharedEncoder};

/// Returns the version string of the linked libopus.
pub fn version() -> String {
    ffi::version()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(super::version().contains("libopus"));
    }

    #[test]
    fn test_error_string() {
        assert!(!super::error_string(-1).is_empty());
    }
}
