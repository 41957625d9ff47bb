//! Candidate scoring and ranking pipeline

pub mod dimension;
pub mod weights;
pub mod candidate;
pub mod thresholds;
pub mod aggregator;
pub mod tie_breaker;
pub mod ranker;
pub mod comparison;
pub mod summary;
pub mod engine;

pub use candidate::{Candidate, CandidateRecord, RankingWarning};
pub use comparison::{ComparativeAnalyzer, ComparisonResult, Winner};
pub use dimension::{DimensionKey, DimensionMap, Priorities, Priority};
pub use engine::{RankingEngine, RankingOutcome, RankingRequest, RankingSettings};
pub use thresholds::{EliminationRecord, Threshold, ThresholdConfig};
pub use weights::{WeightNormalizer, WeightVector};
