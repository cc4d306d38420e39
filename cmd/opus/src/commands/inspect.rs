//! Packet inspection command.

use anyhow::Context;
use clap::Args;
use giztoy_opus::packet::{self, TOC};
use serde::Serialize;

use super::output_result;
use crate::Cli;

/// Inspect the header of a hex-encoded packet.
#[derive(Args)]
pub struct InspectCommand {
    /// Packet bytes as hex (e.g. fc0a1b)
    packet: String,
}

#[derive(Debug, Serialize)]
struct PacketInfo {
    bytes: usize,
    toc: String,
    mode: String,
    bandwidth: String,
    frame_duration: String,
    frames: usize,
    channels: usize,
    samples_per_frame: usize,
    total_samples: usize,
}

impl InspectCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let data = hex::decode(self.packet.trim()).context("packet is not valid hex")?;
        let info = inspect(&data)?;
        output_result(cli, &info)
    }
}

fn inspect(data: &[u8]) -> anyhow::Result<PacketInfo> {
    let toc = TOC::parse(data)?;
    let config = toc.configuration();
    Ok(PacketInfo {
        bytes: data.len(),
        toc: format!("{:#04x}", toc.0),
        mode: config.mode().to_string(),
        bandwidth: config.bandwidth().to_string(),
        frame_duration: config.frame_duration().to_string(),
        frames: packet::frame_count(data)?,
        channels: packet::channel_count(data)?,
        samples_per_frame: packet::samples_per_frame(data)?,
        total_samples: packet::sample_count(data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_celt_stereo() {
        // config 31 (CELT FB 20ms), stereo, code 1
        let info = inspect(&[0xfd, 0x00, 0x00]).unwrap();
        assert_eq!(info.toc, "0xfd");
        assert_eq!(info.mode, "CELT");
        assert_eq!(info.bandwidth, "Fullband");
        assert_eq!(info.frames, 2);
        assert_eq!(info.channels, 2);
        assert_eq!(info.samples_per_frame, 960);
        assert_eq!(info.total_samples, 1920);
    }

    #[test]
    fn test_inspect_empty() {
        assert!(inspect(&[]).is_err());
    }
}
