//! Candidate records as received from score extraction, and the annotated
//! candidate that flows through a ranking pass

use crate::error::{RankerError, Result};
use crate::ranking::dimension::{parse_keyed, DimensionKey, DimensionMap};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Externally supplied per-dimension scores, 0..=100
pub type CandidateScore = DimensionMap<u8>;

/// Raw candidate as supplied by the score extractor. Scores may be missing,
/// null, out of range or keyed by an unknown dimension;
/// [`CandidateRecord::into_candidate`] settles that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, Option<i64>>,
}

/// Candidate with the fields derived during a ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub scores: CandidateScore,
    #[serde(default)]
    pub match_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(default)]
    pub eliminated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elimination_reason: Option<String>,
    #[serde(default)]
    pub tie_breaker_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker_reason: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: Option<String>, scores: CandidateScore) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email,
            scores,
            match_score: 0,
            rank: None,
            eliminated: false,
            elimination_reason: None,
            tie_breaker_applied: false,
            tie_breaker_reason: None,
        }
    }

    pub fn score(&self, key: DimensionKey) -> u8 {
        self.scores[key]
    }

    /// Drop everything a previous pass derived
    pub fn reset_derived(&mut self) {
        self.match_score = 0;
        self.rank = None;
        self.eliminated = false;
        self.elimination_reason = None;
        self.tie_breaker_applied = false;
        self.tie_breaker_reason = None;
    }
}

/// Non-fatal data problems surfaced next to a ranking result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingWarning {
    /// Missing scores were treated as 0
    InsufficientData {
        candidate_id: String,
        candidate_name: String,
        missing: Vec<DimensionKey>,
    },
    /// A score outside 0..=100 was clamped
    ScoreClamped {
        candidate_id: String,
        dimension: DimensionKey,
        original: i64,
        clamped: u8,
    },
}

impl fmt::Display for RankingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingWarning::InsufficientData { candidate_name, candidate_id, missing } => {
                let labels: Vec<&str> = missing.iter().map(|k| k.label()).collect();
                write!(
                    f,
                    "{} ({}) is missing {} score(s); treated as 0",
                    candidate_name,
                    candidate_id,
                    labels.join(", ")
                )
            }
            RankingWarning::ScoreClamped { candidate_id, dimension, original, clamped } => write!(
                f,
                "{} score {} for {} is out of range; clamped to {}",
                dimension.label(),
                original,
                candidate_id,
                clamped
            ),
        }
    }
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            scores: BTreeMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_score(mut self, key: DimensionKey, score: i64) -> Self {
        self.scores.insert(key.as_str().to_string(), Some(score));
        self
    }

    pub fn with_scores(mut self, scores: [i64; 5]) -> Self {
        for (key, score) in DimensionKey::ALL.into_iter().zip(scores) {
            self.scores.insert(key.as_str().to_string(), Some(score));
        }
        self
    }

    /// Settle scores into a [`Candidate`].
    ///
    /// Missing scores become 0 with an `InsufficientData` warning, or an
    /// error when `strict` is set. Out-of-range scores are clamped. A score
    /// for an unknown dimension is a configuration error.
    pub fn into_candidate(self, strict: bool) -> Result<(Candidate, Vec<RankingWarning>)> {
        if self.id.trim().is_empty() {
            return Err(RankerError::InvalidInput(format!(
                "Candidate '{}' has an empty id",
                self.name
            )));
        }
        let raw_scores = parse_keyed(self.scores)?;

        let mut warnings = Vec::new();
        let mut missing = Vec::new();

        let scores = DimensionMap::from_fn(|key| match raw_scores.get(&key).copied().flatten() {
            Some(raw) => {
                let clamped = raw.clamp(0, 100) as u8;
                if i64::from(clamped) != raw {
                    warnings.push(RankingWarning::ScoreClamped {
                        candidate_id: self.id.clone(),
                        dimension: key,
                        original: raw,
                        clamped,
                    });
                }
                clamped
            }
            None => {
                missing.push(key);
                0
            }
        });

        if !missing.is_empty() {
            let labels: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
            if strict {
                return Err(RankerError::InsufficientData(format!(
                    "Candidate {} ({}) is missing score(s) for {}",
                    self.name,
                    self.id,
                    labels.join(", ")
                )));
            }
            warn!(
                "Candidate {} is missing score(s) for {}; treating as 0",
                self.id,
                labels.join(", ")
            );
            warnings.push(RankingWarning::InsufficientData {
                candidate_id: self.id.clone(),
                candidate_name: self.name.clone(),
                missing,
            });
        }

        let name = if self.name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            self.name
        };

        Ok((Candidate::new(self.id, name, self.email, scores), warnings))
    }
}
