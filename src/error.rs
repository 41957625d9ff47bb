//! Error handling for the candidate ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Comparison input error: {0}")]
    ComparisonInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, RankerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for RankerError {
    fn from(err: anyhow::Error) -> Self {
        RankerError::InvalidInput(err.to_string())
    }
}

/// Convert TOML parse errors to our custom error type
impl From<toml::de::Error> for RankerError {
    fn from(err: toml::de::Error) -> Self {
        RankerError::Configuration(format!("Failed to parse TOML: {}", err))
    }
}
