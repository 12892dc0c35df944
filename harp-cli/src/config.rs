//! Configuration loading and parsing

use anyhow::{Context, Result};
use harp_decoder::{DecoderConfig, MessageTypeFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    pub file: Option<PathBuf>,
}

/// Message categories to decode
///
/// Either a list of names or the individual flags; a list wins when both are given.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub message_types: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub read: bool,
    #[serde(default = "default_true")]
    pub write: bool,
    #[serde(default = "default_true")]
    pub event: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            message_types: None,
            read: true,
            write: true,
            event: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Summary,
}

impl FilterConfig {
    /// Turn the filter section into a decoder configuration
    pub fn decoder_config(&self) -> Result<DecoderConfig> {
        match &self.message_types {
            Some(names) => {
                let filter = MessageTypeFilter::from_names(names)
                    .context("Invalid [filter] message_types")?;
                Ok(DecoderConfig::new().with_message_types(&filter))
            }
            None => Ok(DecoderConfig::new()
                .with_read(self.read)
                .with_write(self.write)
                .with_event(self.event)),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // Fail early on bad category names rather than after reading the input
    config.filter.decoder_config()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            file = "Behavior_32.bin"

            [filter]
            write = false

            [output]
            format = "json"
            path = "out.json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.file, Some(PathBuf::from("Behavior_32.bin")));
        assert_eq!(config.output.format, OutputFormat::Json);

        let decoder_config = config.filter.decoder_config().unwrap();
        assert!(decoder_config.include_read);
        assert!(!decoder_config.include_write);
        assert!(decoder_config.include_event);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.file.is_none());
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.filter.decoder_config().unwrap(), DecoderConfig::new());
    }

    #[test]
    fn test_message_type_names() {
        let config: AppConfig = toml::from_str(
            r#"
            [filter]
            message_types = ["event"]
            "#,
        )
        .unwrap();

        let decoder_config = config.filter.decoder_config().unwrap();
        assert!(!decoder_config.include_read);
        assert!(!decoder_config.include_write);
        assert!(decoder_config.include_event);
    }

    #[test]
    fn test_load_config_rejects_unknown_message_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[filter]\nmessage_types = [\"reed\"]\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("reed"));
    }
}
