//! Configuration management for the candidate ranker

use crate::error::{RankerError, Result};
use crate::ranking::dimension::DimensionKey;
use crate::ranking::engine::RankingSettings;
use crate::ranking::thresholds::Threshold;
use crate::ranking::weights::WeightNormalizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ranking: RankingSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = RankerError;

    fn from_str(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(RankerError::InvalidInput(format!(
                "Invalid output format: {}. Supported: console, json, markdown, csv",
                format
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ranking: RankingSettings::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RankerError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("candidate-ranker")
            .join("config.toml")
    }

    /// Set a single value by dotted key, e.g. `weights.skills` or
    /// `thresholds.experience.minimum`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["ranking", "shortlist_size"] => {
                let size: usize = parse_value(key, value)?;
                if size == 0 {
                    return Err(RankerError::Configuration(
                        "ranking.shortlist_size must be at least 1".to_string(),
                    ));
                }
                self.ranking.shortlist_size = size;
            }
            ["ranking", "strict_missing_scores"] => {
                self.ranking.strict_missing_scores = parse_value(key, value)?;
            }
            ["weights", dimension] => {
                let dimension = DimensionKey::from_str(dimension)?;
                let weight = parse_percentage(key, value)?;
                self.ranking.weights = WeightNormalizer::adjust(&self.ranking.weights, dimension, weight);
            }
            ["thresholds", dimension, field] => {
                let dimension = DimensionKey::from_str(dimension)?;
                let current = self.ranking.thresholds.get(dimension);
                let updated = match *field {
                    "enabled" => Threshold {
                        enabled: parse_value(key, value)?,
                        ..current
                    },
                    "minimum" => Threshold {
                        minimum: parse_percentage(key, value)?,
                        ..current
                    },
                    _ => return Err(unknown_key(key)),
                };
                self.ranking.thresholds.set(dimension, updated)?;
            }
            ["output", "format"] => self.output.format = value.parse()?,
            ["output", "detailed"] => self.output.detailed = parse_value(key, value)?,
            ["output", "color_output"] => self.output.color_output = parse_value(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RankerError::Configuration(format!("Invalid value for {}: {}", key, value)))
}

fn parse_percentage(key: &str, value: &str) -> Result<u8> {
    let parsed: u8 = parse_value(key, value)?;
    if parsed > 100 {
        return Err(RankerError::Configuration(format!(
            "{} must be between 0 and 100, got {}",
            key, parsed
        )));
    }
    Ok(parsed)
}

fn unknown_key(key: &str) -> RankerError {
    RankerError::Configuration(format!("Unknown configuration key: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ranking.shortlist_size, 6);
        assert_eq!(config.ranking.weights.total(), 100);
        assert!(!config.ranking.thresholds.any_enabled());
        assert_eq!(config.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("weights.skills", "40").unwrap();
        config.set("thresholds.experience.enabled", "true").unwrap();
        config.set("thresholds.experience.minimum", "60").unwrap();
        config.set("output.format", "md").unwrap();
        config.save_to(&path).unwrap();

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.ranking.weights.get(DimensionKey::Skills), 40);
        assert_eq!(reloaded.ranking.weights.get(DimensionKey::Experience), 15);
        assert_eq!(
            reloaded.ranking.thresholds.get(DimensionKey::Experience),
            Threshold::enabled(60)
        );
        assert_eq!(reloaded.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_invalid_weights_in_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let content = toml::to_string_pretty(&Config::default())
            .unwrap()
            .replace("experience = 20", "experience = 90");
        std::fs::write(&path, content).unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(RankerError::Configuration(_))));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set("weights.salary", "10").is_err());
        assert!(config.set("weights.skills", "101").is_err());
        assert!(config.set("thresholds.skills.colour", "1").is_err());
        assert!(config.set("ranking.shortlist_size", "0").is_err());
        assert!(config.set("output.format", "pdf").is_err());
        assert!(config.set("nonsense", "1").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
