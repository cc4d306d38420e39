//! Opus CLI - encode, decode and inspect Opus packets with libopus.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{InspectCommand, RoundtripCommand};

/// Opus CLI - encode, decode and inspect Opus packets.
///
/// Every session runs at 48 kHz, stereo, with the VoIP application.
/// Raw PCM files are interleaved signed 16-bit little-endian.
#[derive(Parser)]
#[command(name = "opus")]
#[command(about = "Opus codec CLI tool")]
#[command(version)]
pub struct Cli {
    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Encoder settings file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true)]
    pub settings: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the linked libopus version
    Version,
    /// Inspect the header of a hex-encoded packet
    Inspect(InspectCommand),
    /// Encode a raw PCM file and decode it back
    Roundtrip(RoundtripCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Version => {
            println!("{}", giztoy_opus::version());
            Ok(())
        }
        Commands::Inspect(cmd) => cmd.run(&cli),
        Commands::Roundtrip(cmd) => cmd.run(&cli).await,
    }
}
