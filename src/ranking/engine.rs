//! Full ranking pass: ingestion checks, elimination, scoring, ranking

use crate::error::{RankerError, Result};
use crate::ranking::aggregator::ScoreAggregator;
use crate::ranking::candidate::{Candidate, CandidateRecord, RankingWarning};
use crate::ranking::comparison::{ComparativeAnalyzer, ComparisonResult};
use crate::ranking::dimension::{parse_keyed, Priorities, Priority};
use crate::ranking::ranker::Ranker;
use crate::ranking::summary::{PoolSummary, TieBreakSummary};
use crate::ranking::thresholds::{EliminationRecord, RawThreshold, ThresholdConfig, ThresholdEliminator};
use crate::ranking::weights::WeightVector;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Defaults applied when a request leaves weights or thresholds out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    pub shortlist_size: usize,
    pub strict_missing_scores: bool,
    pub weights: WeightVector,
    pub thresholds: ThresholdConfig,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            shortlist_size: 6,
            strict_missing_scores: false,
            weights: WeightVector::default(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// Ranking request as received from the score extractor. Dimension keys
/// stay strings until [`RankingEngine::prepare`] resolves them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingRequest {
    pub candidates: Vec<CandidateRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<BTreeMap<String, RawThreshold>>,
    #[serde(default)]
    pub priorities: BTreeMap<String, Priority>,
}

/// Validated inputs for one pass
#[derive(Debug, Clone)]
pub struct PreparedPool {
    pub candidates: Vec<Candidate>,
    pub weights: WeightVector,
    pub thresholds: ThresholdConfig,
    pub priorities: Priorities,
    pub warnings: Vec<RankingWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub ranked: Vec<Candidate>,
    pub eliminated: EliminationRecord,
    pub eliminated_candidates: Vec<Candidate>,
    pub tie_breaks: TieBreakSummary,
    pub pool: PoolSummary,
    pub warnings: Vec<RankingWarning>,
    pub weights: WeightVector,
    pub thresholds: ThresholdConfig,
    pub priorities: Priorities,
}

impl RankingOutcome {
    pub fn shortlist(&self) -> &[Candidate] {
        let end = self.pool.shortlist_size.min(self.ranked.len());
        &self.ranked[..end]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub candidate_1: Candidate,
    pub candidate_2: Candidate,
    pub result: ComparisonResult,
    pub warnings: Vec<RankingWarning>,
}

pub struct RankingEngine {
    settings: RankingSettings,
}

impl RankingEngine {
    pub fn new(settings: RankingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RankingSettings {
        &self.settings
    }

    /// Validate a request at the ingestion boundary.
    pub fn prepare(&self, request: RankingRequest) -> Result<PreparedPool> {
        let weights = match request.weights {
            Some(raw) => WeightVector::from_raw(raw)?,
            None => self.settings.weights,
        };
        let thresholds = match request.thresholds {
            Some(raw) => ThresholdConfig::from_raw(raw)?,
            None => self.settings.thresholds,
        };
        let priorities = Priorities::from_partial_priorities(parse_keyed(request.priorities)?);

        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(request.candidates.len());
        let mut warnings = Vec::new();
        for record in request.candidates {
            if !seen.insert(record.id.clone()) {
                return Err(RankerError::InvalidInput(format!(
                    "Duplicate candidate id: {}",
                    record.id
                )));
            }
            let (candidate, mut record_warnings) = record.into_candidate(self.settings.strict_missing_scores)?;
            candidates.push(candidate);
            warnings.append(&mut record_warnings);
        }

        Ok(PreparedPool {
            candidates,
            weights,
            thresholds,
            priorities,
            warnings,
        })
    }

    pub fn run(&self, request: RankingRequest) -> Result<RankingOutcome> {
        let pool = self.prepare(request)?;
        Ok(self.rank_pool(pool))
    }

    /// Eliminate, score and rank an already validated pool
    pub fn rank_pool(&self, pool: PreparedPool) -> RankingOutcome {
        let PreparedPool {
            mut candidates,
            weights,
            thresholds,
            priorities,
            warnings,
        } = pool;

        info!(
            "Ranking {} candidates with weights: {}",
            candidates.len(),
            weights
        );
        for warning in &warnings {
            warn!("{}", warning);
        }
        candidates.iter_mut().for_each(Candidate::reset_derived);

        let outcome = ThresholdEliminator::apply(candidates, &thresholds);
        let mut survivors = outcome.survivors;
        ScoreAggregator::apply(&mut survivors, &weights);

        let ranked = Ranker::new(&weights, &priorities).rank(survivors);
        let tie_breaks = TieBreakSummary::from_ranked(&ranked);
        let pool = PoolSummary::new(&ranked, outcome.record.count, self.settings.shortlist_size);

        RankingOutcome {
            ranked,
            eliminated: outcome.record,
            eliminated_candidates: outcome.eliminated,
            tie_breaks,
            pool,
            warnings,
            weights,
            thresholds,
            priorities,
        }
    }

    /// Compare two candidates of a request by id. Thresholds do not apply;
    /// both are scored with the request's weights.
    pub fn compare(&self, request: RankingRequest, first_id: &str, second_id: &str) -> Result<ComparisonOutcome> {
        let pool = self.prepare(request)?;

        let mut selection = Vec::with_capacity(2);
        for id in [first_id, second_id] {
            let candidate = pool.candidates.iter().find(|c| c.id == id).ok_or_else(|| {
                RankerError::ComparisonInput(format!("Unknown candidate id: {}", id))
            })?;
            let mut candidate = candidate.clone();
            candidate.reset_derived();
            candidate.match_score = ScoreAggregator::score(&candidate.scores, &pool.weights);
            selection.push(candidate);
        }

        let refs: Vec<&Candidate> = selection.iter().collect();
        let result = ComparativeAnalyzer::compare_selection(&refs, &pool.priorities)?;

        let mut selection = selection.into_iter();
        match (selection.next(), selection.next()) {
            (Some(candidate_1), Some(candidate_2)) => Ok(ComparisonOutcome {
                candidate_1,
                candidate_2,
                result,
                warnings: pool.warnings,
            }),
            _ => Err(RankerError::ComparisonInput(
                "Comparison requires exactly 2 candidates".to_string(),
            )),
        }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(RankingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parser::{JsonParser, RequestParser, TomlParser};
    use crate::ranking::dimension::DimensionKey;
    use crate::ranking::thresholds::Threshold;

    fn record(id: &str, name: &str, scores: [i64; 5]) -> CandidateRecord {
        CandidateRecord::new(id, name).with_scores(scores)
    }

    fn request() -> RankingRequest {
        RankingRequest {
            candidates: vec![
                record("c1", "Alice High", [85, 90, 80, 75, 70]),
                record("c2", "Bob Medium", [65, 60, 55, 50, 60]),
                record("c3", "Carol Low", [45, 50, 40, 35, 55]),
                record("c4", "Dave VeryLow", [30, 35, 25, 20, 40]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_run_without_thresholds() {
        let outcome = RankingEngine::default().run(request()).unwrap();

        let ids: Vec<&str> = outcome.ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3", "c4"]);
        assert_eq!(outcome.ranked[0].match_score, 80);
        assert_eq!(outcome.eliminated.count, 0);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.pool.total_in_pool, 4);
    }

    #[test]
    fn test_run_with_thresholds() {
        let mut req = request();
        req.thresholds = Some(BTreeMap::from([(
            "experience".to_string(),
            RawThreshold::from(Threshold::enabled(60)),
        )]));
        let outcome = RankingEngine::default().run(req).unwrap();

        assert_eq!(outcome.ranked.len(), 2);
        assert_eq!(outcome.eliminated.count, 2);
        assert!(outcome.eliminated_candidates.iter().all(|c| c.rank.is_none()));
        assert_eq!(outcome.pool.explanation, "4 candidates in pool. 2 eliminated by thresholds.");
    }

    #[test]
    fn test_settings_thresholds_used_when_request_omits_them() {
        let settings = RankingSettings {
            thresholds: ThresholdConfig::default()
                .with(DimensionKey::Skills, Threshold::enabled(55))
                .unwrap(),
            ..Default::default()
        };
        let outcome = RankingEngine::new(settings).run(request()).unwrap();
        assert_eq!(outcome.eliminated.count, 2);
    }

    #[test]
    fn test_bad_weights_rejected() {
        let mut req = request();
        req.weights = Some(DimensionKey::ALL.into_iter().map(|k| (k.as_str().to_string(), 30)).collect());
        let result = RankingEngine::default().run(req);
        assert!(matches!(result, Err(RankerError::Configuration(_))));

        let mut req = request();
        req.weights = Some(BTreeMap::from([("experience".to_string(), 100)]));
        let err = RankingEngine::default().run(req).unwrap_err();
        assert!(err.to_string().contains("Missing dimension"));

        let mut req = request();
        req.weights = Some(BTreeMap::from([("salary".to_string(), 100)]));
        let result = RankingEngine::default().run(req);
        assert!(matches!(result, Err(RankerError::Configuration(msg)) if msg.contains("salary")));

        let mut req = request();
        req.weights = Some(BTreeMap::from([("experience".to_string(), 300)]));
        let result = RankingEngine::default().run(req);
        assert!(matches!(result, Err(RankerError::Configuration(msg)) if msg.contains("300%")));
    }

    #[test]
    fn test_bad_dimensions_rejected_the_same_in_json_and_toml() {
        let cases = [
            (
                r#"{"candidates": [], "weights": {"salary": 100}}"#,
                "candidates = []\n[weights]\nsalary = 100\n",
            ),
            (
                r#"{"candidates": [], "weights": {"experience": 300}}"#,
                "candidates = []\n[weights]\nexperience = 300\n",
            ),
            (
                r#"{"candidates": [{"id": "c1", "name": "A", "scores": {"salary": 10}}]}"#,
                "[[candidates]]\nid = \"c1\"\nname = \"A\"\n[candidates.scores]\nsalary = 10\n",
            ),
            (
                r#"{"candidates": [], "thresholds": {"experience": {"enabled": true, "minimum": 300}}}"#,
                "candidates = []\n[thresholds.experience]\nenabled = true\nminimum = 300\n",
            ),
            (
                r#"{"candidates": [], "priorities": {"salary": "CRITICAL"}}"#,
                "candidates = []\n[priorities]\nsalary = \"CRITICAL\"\n",
            ),
        ];

        let engine = RankingEngine::default();
        for (json, toml) in cases {
            let from_json = engine.run(JsonParser.parse(json).unwrap());
            let from_toml = engine.run(TomlParser.parse(toml).unwrap());
            assert!(matches!(from_json, Err(RankerError::Configuration(_))), "{}", json);
            assert!(matches!(from_toml, Err(RankerError::Configuration(_))), "{}", toml);
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut req = request();
        req.candidates.push(record("c1", "Alice Again", [50; 5]));
        assert!(matches!(
            RankingEngine::default().run(req),
            Err(RankerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_scores_surface_as_warnings() {
        let mut req = request();
        req.candidates
            .push(CandidateRecord::new("c5", "Eve Partial").with_score(DimensionKey::Skills, 100));
        let outcome = RankingEngine::default().run(req).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        let eve = outcome.ranked.iter().find(|c| c.id == "c5").unwrap();
        assert_eq!(eve.match_score, 20);

        let strict = RankingEngine::new(RankingSettings {
            strict_missing_scores: true,
            ..Default::default()
        });
        let mut req = request();
        req.candidates.push(CandidateRecord::new("c5", "Eve Partial"));
        assert!(matches!(strict.run(req), Err(RankerError::InsufficientData(_))));
    }

    #[test]
    fn test_compare_by_id() {
        let outcome = RankingEngine::default().compare(request(), "c2", "c1").unwrap();

        assert_eq!(outcome.candidate_1.id, "c2");
        assert_eq!(outcome.candidate_1.match_score, 58);
        assert_eq!(outcome.result.overall_winner, crate::ranking::comparison::Winner::Candidate2);
        assert!(outcome.result.explanation.starts_with("Alice High ranks higher overall with a 22% score advantage."));
    }

    #[test]
    fn test_compare_unknown_or_same_id() {
        let engine = RankingEngine::default();
        assert!(matches!(
            engine.compare(request(), "c1", "nope"),
            Err(RankerError::ComparisonInput(_))
        ));
        assert!(matches!(
            engine.compare(request(), "c1", "c1"),
            Err(RankerError::ComparisonInput(_))
        ));
    }
}
