//! Conversions between raw PCM bytes and 16-bit samples.
//!
//! Raw buffers hold interleaved signed 16-bit little-endian samples.

use crate::config::BYTES_PER_FRAME;
use crate::error::{alloc_zeroed, Error, Result};

/// Converts raw PCM bytes to samples.
///
/// The length must be a whole number of interleaved frames.
pub fn bytes_to_samples(pcm: &[u8]) -> Result<Vec<i16>> {
    if pcm.len() % BYTES_PER_FRAME != 0 {
        return Err(Error::BadArgument);
    }
    let mut samples = alloc_zeroed::<i16>(pcm.len() / 2)?;
    for (sample, bytes) in samples.iter_mut().zip(pcm.chunks_exact(2)) {
        *sample = i16::from_le_bytes([bytes[0], bytes[1]]);
    }
    Ok(samples)
}

/// Converts samples to raw PCM bytes.
pub fn samples_to_bytes(samples: &[i16]) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(samples.len() * 2)
        .map_err(|_| Error::AllocationFailure)?;
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_samples() {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0xff, 0x7f];
        let samples = bytes_to_samples(&bytes).unwrap();
        assert_eq!(samples, vec![1, -1, i16::MIN, i16::MAX]);
    }

    #[test]
    fn test_bytes_to_samples_misaligned() {
        assert_eq!(bytes_to_samples(&[0u8; 6]), Err(Error::BadArgument));
        assert_eq!(bytes_to_samples(&[0u8; 3]), Err(Error::BadArgument));
    }

    #[test]
    fn test_bytes_to_samples_empty() {
        assert_eq!(bytes_to_samples(&[]), Ok(vec![]));
    }

    #[test]
    fn test_samples_to_bytes() {
        let bytes = samples_to_bytes(&[1, -1, 256]).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00, 0xff, 0xff, 0x00, 0x01]);
    }
}
