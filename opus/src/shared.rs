//! Sessions usable from async code.
//!
//! Native encode and decode calls run on tokio's blocking pool so they never
//! stall the async scheduler. Each wrapper holds its session behind a mutex,
//! so concurrent calls on one session are serialized; distinct sessions run
//! in parallel.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::config::EncoderSettings;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};

/// Encoder session shared between tasks.
#[derive(Debug, Clone)]
pub struct SharedEncoder {
    inner: Arc<Mutex<Encoder>>,
}

impl SharedEncoder {
    /// Creates a new shared encoder.
    pub fn new() -> Result<Self> {
        Ok(Self::from(Encoder::new()?))
    }

    /// Encodes raw PCM bytes on the blocking pool. See [`Encoder::encode`].
    pub async fn encode(&self, pcm: Vec<u8>, frame_size: i32) -> Result<Vec<u8>> {
        let inner = self.inner.clone();
        run_blocking(move || lock(&inner)?.encode(&pcm, frame_size)).await
    }

    /// Applies encoder settings. See [`EncoderSettings::apply`].
    pub async fn apply(&self, settings: EncoderSettings) -> Result<()> {
        let inner = self.inner.clone();
        run_blocking(move || settings.apply(&mut *lock(&inner)?)).await
    }
}

impl From<Encoder> for SharedEncoder {
    fn from(encoder: Encoder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(encoder)),
        }
    }
}

/// Decoder session shared between tasks.
#[derive(Debug, Clone)]
pub struct SharedDecoder {
    inner: Arc<Mutex<Decoder>>,
}

impl SharedDecoder {
    /// Creates a new shared decoder.
    pub fn new() -> Result<Self> {
        Ok(Self::from(Decoder::new()?))
    }

    /// Decodes a packet on the blocking pool. See [`Decoder::decode`].
    pub async fn decode(
        &self,
        packet: Vec<u8>,
        frame_size: i32,
        channels: i32,
        decode_fec: bool,
    ) -> Result<Vec<u8>> {
        let inner = self.inner.clone();
        run_blocking(move || lock(&inner)?.decode(&packet, frame_size, channels, decode_fec))
            .await
    }

    /// Returns the duration of the last decoded packet.
    pub async fn last_packet_duration(&self) -> Result<i32> {
        let inner = self.inner.clone();
        run_blocking(move || lock(&inner)?.last_packet_duration()).await
    }
}

impl From<Decoder> for SharedDecoder {
    fn from(decoder: Decoder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(decoder)),
        }
    }
}

// A poisoned session panicked mid-call; its native state is not trusted.
fn lock<T>(inner: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    inner.lock().map_err(|_| Error::InvalidState)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        warn!("opus blocking task failed: {}", e);
        Error::InvalidState
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_roundtrip() {
        let encoder = SharedEncoder::new().unwrap();
        let decoder = SharedDecoder::new().unwrap();

        let packet = encoder.encode(vec![0u8; 960 * 4], 960).await.unwrap();
        let decoded = decoder.decode(packet, 960, 2, false).await.unwrap();
        assert_eq!(decoded.len(), 960 * 4);
        assert_eq!(decoder.last_packet_duration().await, Ok(960));
    }

    #[tokio::test]
    async fn test_shared_apply() {
        let encoder = SharedEncoder::new().unwrap();
        let settings = EncoderSettings {
            bitrate: Some(16000),
            fec: true,
            packet_loss_percent: 20,
        };
        assert!(encoder.apply(settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_shared_errors_propagate() {
        let encoder = SharedEncoder::new().unwrap();
        assert_eq!(encoder.encode(vec![], 0).await, Err(Error::BadArgument));
    }

    #[tokio::test]
    async fn test_shared_concurrent_calls() {
        let encoder = SharedEncoder::new().unwrap();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let encoder = encoder.clone();
            handles.push(tokio::spawn(async move {
                encoder.encode(vec![0u8; 480 * 4], 480).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
