//! Shared helpers for commands.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use giztoy_opus::EncoderSettings;
use serde::Serialize;

use crate::Cli;

/// Loads encoder settings from a YAML or JSON file.
///
/// The extension picks the parser; unknown extensions try YAML, then JSON.
pub fn load_settings(path: impl AsRef<Path>) -> anyhow::Result<EncoderSettings> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_settings(&data, path)
}

pub fn parse_settings(data: &[u8], path: &Path) -> anyhow::Result<EncoderSettings> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            bail!("failed to parse {} (tried YAML and JSON)", path.display())
        }
    }
}

/// Returns the settings named by `-f`, or the defaults.
pub fn settings_from_cli(cli: &Cli) -> anyhow::Result<EncoderSettings> {
    match &cli.settings {
        Some(path) => load_settings(path),
        None => Ok(EncoderSettings::default()),
    }
}

/// Prints a result as YAML, or JSON with `--json`.
pub fn output_result<T: Serialize>(cli: &Cli, value: &T) -> anyhow::Result<()> {
    let output = if cli.json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_yaml::to_string(value)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output.trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_yaml() {
        let settings = parse_settings(b"bitrate: 32000\nfec: true\n", Path::new("s.yaml")).unwrap();
        assert_eq!(settings.bitrate, Some(32000));
        assert!(settings.fec);
        assert_eq!(settings.packet_loss_percent, 0);
    }

    #[test]
    fn test_parse_settings_json() {
        let settings =
            parse_settings(br#"{"packet_loss_percent": 12}"#, Path::new("s.json")).unwrap();
        assert_eq!(settings.packet_loss_percent, 12);
    }

    #[test]
    fn test_parse_settings_unknown_extension() {
        let settings = parse_settings(br#"{"fec": true}"#, Path::new("settings")).unwrap();
        assert!(settings.fec);
    }

    #[test]
    fn test_parse_settings_invalid() {
        assert!(parse_settings(b"fec: [", Path::new("s.yaml")).is_err());
    }

    #[test]
    fn test_load_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.yaml");
        fs::write(&path, "bitrate: 64000\n").unwrap();
        assert_eq!(load_settings(&path).unwrap().bitrate, Some(64000));
    }
}
