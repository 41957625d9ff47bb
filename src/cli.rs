//! CLI interface for the candidate ranker

use crate::ranking::dimension::DimensionKey;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions accepted for ranking request files
pub const REQUEST_EXTENSIONS: [&str; 2] = ["json", "toml"];

#[derive(Parser)]
#[command(name = "candidate-ranker")]
#[command(about = "Weighted multi-dimension candidate ranking")]
#[command(long_about = "Rank a pool of candidates from per-dimension scores using configurable weights, threshold elimination and explainable tie-breaking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank every candidate in a request file
    Rank {
        /// Path to ranking request (JSON, TOML)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format: console, json, markdown, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file, or into a directory under a generated name
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show per-dimension scores and candidates below the shortlist
        #[arg(short, long)]
        detailed: bool,
    },

    /// Compare two candidates from a request file
    Compare {
        /// Path to ranking request (JSON, TOML)
        #[arg(short, long)]
        input: PathBuf,

        /// Id of the first candidate
        first: String,

        /// Id of the second candidate
        second: String,

        /// Output format: console, json, markdown, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file, or into a directory under a generated name
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Inspect and rebalance the configured weights
    Weights {
        #[command(subcommand)]
        action: WeightAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum WeightAction {
    /// Show the configured weights
    Show,

    /// Change one weight and redistribute the rest so the total stays 100
    Adjust {
        /// Dimension to change (experience, skills, projects, positions, education)
        dimension: String,

        /// New weight, 0-100
        value: u8,

        /// Persist the result to the configuration file
        #[arg(short, long)]
        save: bool,
    },

    /// Rescale arbitrary weights to sum to 100, e.g. "experience=3,skills=1"
    Normalize {
        /// Comma separated dimension=value pairs; omitted dimensions count as 20
        values: String,

        /// Persist the result to the configuration file
        #[arg(short, long)]
        save: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "weights.skills", "thresholds.experience.minimum")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse `dimension=value` pairs into raw weights
pub fn parse_weight_pairs(input: &str) -> Result<BTreeMap<DimensionKey, u32>, String> {
    let mut weights = BTreeMap::new();
    for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected dimension=value, got: {}", pair))?;
        let key: DimensionKey = key.trim().parse().map_err(|e| format!("{}", e))?;
        let value: u32 = value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid weight for {}: {}", key, value.trim()))?;
        if weights.insert(key, value).is_some() {
            return Err(format!("Dimension given twice: {}", key.as_str()));
        }
    }
    Ok(weights)
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
