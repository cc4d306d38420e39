//! Encode/decode roundtrip command.

use std::fs;

use anyhow::{bail, Context};
use clap::Args;
use giztoy_opus::config::{frame_size_for, pcm_len};
use giztoy_opus::{FrameDuration, SharedDecoder, SharedEncoder, CHANNELS};
use serde::Serialize;
use tracing::{debug, info};

use super::{output_result, settings_from_cli};
use crate::Cli;

/// Encode a raw PCM file frame by frame and decode every packet back.
///
/// Input is 48 kHz stereo s16le. A trailing partial frame is zero-padded.
/// With -o, the decoded PCM is written to that file.
#[derive(Args)]
pub struct RoundtripCommand {
    /// Raw PCM input file
    #[arg(long)]
    pub(crate) input: String,

    /// Frame duration in milliseconds (2.5, 5, 10, 20, 40, 60)
    #[arg(long, default_value = "20")]
    pub(crate) frame_ms: String,
}

#[derive(Debug, Serialize)]
struct RoundtripStats {
    packets: usize,
    frame_size: i32,
    pcm_bytes: usize,
    encoded_bytes: usize,
    decoded_bytes: usize,
    compression_ratio: f64,
    min_packet_bytes: usize,
    max_packet_bytes: usize,
}

impl RoundtripCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let fd = parse_frame_duration(&self.frame_ms)?;
        let frame_size = frame_size_for(fd);
        let settings = settings_from_cli(cli)?;
        debug!("encoder settings: {:?}", settings);

        let pcm = fs::read(&self.input).with_context(|| format!("failed to read {}", self.input))?;
        if pcm.is_empty() {
            bail!("{} is empty", self.input);
        }

        let encoder = SharedEncoder::new()?;
        encoder.apply(settings).await?;
        let decoder = SharedDecoder::new()?;

        let frame_bytes = pcm_len(frame_size);
        let mut stats = RoundtripStats {
            packets: 0,
            frame_size,
            pcm_bytes: pcm.len(),
            encoded_bytes: 0,
            decoded_bytes: 0,
            compression_ratio: 0.0,
            min_packet_bytes: usize::MAX,
            max_packet_bytes: 0,
        };
        let mut decoded = Vec::with_capacity(pcm.len() + frame_bytes);

        for chunk in pcm.chunks(frame_bytes) {
            let mut frame = chunk.to_vec();
            frame.resize(frame_bytes, 0);

            let packet = encoder.encode(frame, frame_size).await?;
            stats.packets += 1;
            stats.encoded_bytes += packet.len();
            stats.min_packet_bytes = stats.min_packet_bytes.min(packet.len());
            stats.max_packet_bytes = stats.max_packet_bytes.max(packet.len());

            let out = decoder.decode(packet, frame_size, CHANNELS, false).await?;
            stats.decoded_bytes += out.len();
            decoded.extend_from_slice(&out);
        }
        stats.compression_ratio = stats.pcm_bytes as f64 / stats.encoded_bytes.max(1) as f64;
        info!(
            "encoded {} packets, {} -> {} bytes",
            stats.packets, stats.pcm_bytes, stats.encoded_bytes
        );

        if let Some(path) = &cli.output {
            fs::write(path, &decoded).with_context(|| format!("failed to write {}", path))?;
        }
        output_result(cli, &stats)
    }
}

fn parse_frame_duration(ms: &str) -> anyhow::Result<FrameDuration> {
    match ms {
        "2.5" => Ok(FrameDuration::Ms2_5),
        "5" => Ok(FrameDuration::Ms5),
        "10" => Ok(FrameDuration::Ms10),
        "20" => Ok(FrameDuration::Ms20),
        "40" => Ok(FrameDuration::Ms40),
        "60" => Ok(FrameDuration::Ms60),
        other => bail!("unsupported frame duration: {}ms", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_duration() {
        assert_eq!(parse_frame_duration("2.5").unwrap(), FrameDuration::Ms2_5);
        assert_eq!(parse_frame_duration("20").unwrap(), FrameDuration::Ms20);
        assert_eq!(parse_frame_duration("60").unwrap(), FrameDuration::Ms60);
        assert!(parse_frame_duration("15").is_err());
        assert!(parse_frame_duration("").is_err());
    }
}
