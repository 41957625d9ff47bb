//! Report structures wrapping ranking and comparison outcomes

use crate::ranking::engine::{ComparisonOutcome, RankingOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Report for a full ranking pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub outcome: RankingOutcome,
}

/// Report for a head-to-head comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Version of the ranker used
    pub tool_version: String,

    /// Request file the candidates came from
    pub input_file: String,

    /// Total processing time
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(input_file: &Path, elapsed: Duration) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
            processing_time_ms: elapsed.as_millis() as u64,
        }
    }

    /// File name of the input, or the full path when it has none
    pub fn input_name(&self) -> String {
        Path::new(&self.input_file)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input_file.clone())
    }

    pub fn generated_label(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

impl RankingReport {
    pub fn new(outcome: RankingOutcome, metadata: ReportMetadata) -> Self {
        Self { metadata, outcome }
    }
}

impl ComparisonReport {
    pub fn new(outcome: ComparisonOutcome, metadata: ReportMetadata) -> Self {
        Self { metadata, outcome }
    }
}
