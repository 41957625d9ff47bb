//! Minimum-score gates applied before ranking

use crate::error::{RankerError, Result};
use crate::ranking::candidate::Candidate;
use crate::ranking::dimension::{parse_keyed, DimensionKey, DimensionMap};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MINIMUM: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_minimum")]
    pub minimum: u8,
}

fn default_minimum() -> u8 {
    DEFAULT_MINIMUM
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            enabled: false,
            minimum: DEFAULT_MINIMUM,
        }
    }
}

impl Threshold {
    pub fn enabled(minimum: u8) -> Self {
        Self { enabled: true, minimum }
    }
}

/// A threshold as written in a request file, before its range is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawThreshold {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_raw_minimum")]
    pub minimum: i64,
}

fn default_raw_minimum() -> i64 {
    i64::from(DEFAULT_MINIMUM)
}

impl From<Threshold> for RawThreshold {
    fn from(threshold: Threshold) -> Self {
        Self {
            enabled: threshold.enabled,
            minimum: i64::from(threshold.minimum),
        }
    }
}

/// Per-dimension gates. Dimensions left out of a serialized config use the
/// default (disabled, minimum 50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<DimensionKey, Threshold>", into = "BTreeMap<DimensionKey, Threshold>")]
pub struct ThresholdConfig(DimensionMap<Threshold>);

impl ThresholdConfig {
    pub fn get(&self, key: DimensionKey) -> Threshold {
        self.0[key]
    }

    pub fn set(&mut self, key: DimensionKey, threshold: Threshold) -> Result<()> {
        if threshold.minimum > 100 {
            return Err(RankerError::Configuration(format!(
                "Minimum for {} is {}%, must be between 0 and 100",
                key.as_str(),
                threshold.minimum
            )));
        }
        self.0[key] = threshold;
        Ok(())
    }

    pub fn with(mut self, key: DimensionKey, threshold: Threshold) -> Result<Self> {
        self.set(key, threshold)?;
        Ok(self)
    }

    pub fn enabled(&self) -> impl Iterator<Item = (DimensionKey, u8)> + '_ {
        self.0
            .iter()
            .filter(|(_, t)| t.enabled)
            .map(|(key, t)| (key, t.minimum))
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled().next().is_some()
    }

    /// Build gates from a request's partial threshold map. Unknown
    /// dimensions and minimums outside 0..=100 are configuration errors.
    pub fn from_raw(raw: BTreeMap<String, RawThreshold>) -> Result<Self> {
        let mut config = Self::default();
        for (key, threshold) in parse_keyed(raw)? {
            let minimum = u8::try_from(threshold.minimum)
                .ok()
                .filter(|m| *m <= 100)
                .ok_or_else(|| {
                    RankerError::Configuration(format!(
                        "Minimum for {} is {}%, must be between 0 and 100",
                        key.as_str(),
                        threshold.minimum
                    ))
                })?;
            config.set(key, Threshold { enabled: threshold.enabled, minimum })?;
        }
        Ok(config)
    }
}

impl TryFrom<BTreeMap<DimensionKey, Threshold>> for ThresholdConfig {
    type Error = RankerError;

    fn try_from(partial: BTreeMap<DimensionKey, Threshold>) -> Result<Self> {
        let mut config = Self::default();
        for (key, threshold) in partial {
            config.set(key, threshold)?;
        }
        Ok(config)
    }
}

impl From<ThresholdConfig> for BTreeMap<DimensionKey, Threshold> {
    fn from(config: ThresholdConfig) -> Self {
        config.0.into()
    }
}

/// One eliminated candidate as listed in the [`EliminationRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminatedEntry {
    pub id: String,
    pub name: String,
    pub reason: String,
    /// Every enabled dimension the candidate fell short on. The reason and
    /// breakdown only cite the first of these.
    pub failing_dimensions: Vec<DimensionKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EliminationRecord {
    pub count: usize,
    pub breakdown: BTreeMap<DimensionKey, usize>,
    pub candidates: Vec<EliminatedEntry>,
}

impl EliminationRecord {
    /// Eliminations per dimension if every failing dimension were counted
    pub fn full_breakdown(&self) -> BTreeMap<DimensionKey, usize> {
        let mut breakdown = BTreeMap::new();
        for entry in &self.candidates {
            for key in &entry.failing_dimensions {
                *breakdown.entry(*key).or_insert(0) += 1;
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone)]
pub struct EliminationOutcome {
    pub survivors: Vec<Candidate>,
    pub eliminated: Vec<Candidate>,
    pub record: EliminationRecord,
}

pub struct ThresholdEliminator;

impl ThresholdEliminator {
    /// Split candidates into survivors and eliminated, preserving input
    /// order on both sides.
    pub fn apply(candidates: Vec<Candidate>, config: &ThresholdConfig) -> EliminationOutcome {
        let mut survivors = Vec::with_capacity(candidates.len());
        let mut eliminated = Vec::new();
        let mut record = EliminationRecord::default();

        for mut candidate in candidates {
            let failing: Vec<(DimensionKey, u8)> = config
                .enabled()
                .filter(|(key, minimum)| candidate.score(*key) < *minimum)
                .collect();

            let Some(&(first, minimum)) = failing.first() else {
                survivors.push(candidate);
                continue;
            };

            let reason = elimination_reason(first, candidate.score(first), minimum);
            debug!("Eliminated {}: {}", candidate.id, reason);

            *record.breakdown.entry(first).or_insert(0) += 1;
            record.candidates.push(EliminatedEntry {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                reason: reason.clone(),
                failing_dimensions: failing.iter().map(|(key, _)| *key).collect(),
            });

            candidate.eliminated = true;
            candidate.elimination_reason = Some(reason);
            candidate.rank = None;
            eliminated.push(candidate);
        }

        record.count = eliminated.len();
        info!(
            "Threshold elimination: {} eliminated, {} remaining",
            record.count,
            survivors.len()
        );

        EliminationOutcome {
            survivors,
            eliminated,
            record,
        }
    }
}

fn elimination_reason(key: DimensionKey, score: u8, minimum: u8) -> String {
    format!("{} {}% < min {}%", key.label(), score, minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::candidate::CandidateRecord;
    use proptest::prelude::*;

    fn candidate(id: &str, name: &str, scores: [i64; 5]) -> Candidate {
        CandidateRecord::new(id, name)
            .with_scores(scores)
            .into_candidate(false)
            .unwrap()
            .0
    }

    fn pool() -> Vec<Candidate> {
        vec![
            candidate("c1", "Alice High", [85, 90, 80, 75, 70]),
            candidate("c2", "Bob Medium", [65, 60, 55, 50, 60]),
            candidate("c3", "Carol Low", [45, 50, 40, 35, 55]),
            candidate("c4", "Dave VeryLow", [30, 35, 25, 20, 40]),
        ]
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_from_raw_validates_keys_and_minimums() {
        let raw = BTreeMap::from([(
            "Skills".to_string(),
            RawThreshold { enabled: true, minimum: 70 },
        )]);
        let config = ThresholdConfig::from_raw(raw).unwrap();
        assert_eq!(config.get(DimensionKey::Skills), Threshold::enabled(70));
        assert!(!config.get(DimensionKey::Experience).enabled);

        let unknown = BTreeMap::from([("salary".to_string(), RawThreshold::from(Threshold::enabled(50)))]);
        assert!(matches!(ThresholdConfig::from_raw(unknown), Err(RankerError::Configuration(_))));

        for minimum in [101, -1, 300] {
            let raw = BTreeMap::from([("experience".to_string(), RawThreshold { enabled: true, minimum })]);
            assert!(matches!(ThresholdConfig::from_raw(raw), Err(RankerError::Configuration(_))));
        }
    }

    #[test]
    fn test_no_thresholds() {
        let outcome = ThresholdEliminator::apply(pool(), &ThresholdConfig::default());

        assert_eq!(outcome.record.count, 0);
        assert!(outcome.record.breakdown.is_empty());
        assert_eq!(outcome.survivors, pool());
    }

    #[test]
    fn test_single_threshold_reason_format() {
        let config = ThresholdConfig::default()
            .with(DimensionKey::Experience, Threshold::enabled(60))
            .unwrap();
        let outcome = ThresholdEliminator::apply(pool(), &config);

        assert_eq!(names(&outcome.survivors), vec!["Alice High", "Bob Medium"]);
        assert_eq!(names(&outcome.eliminated), vec!["Carol Low", "Dave VeryLow"]);
        assert_eq!(outcome.record.candidates[0].reason, "Experience 45% < min 60%");
        assert_eq!(outcome.record.breakdown.get(&DimensionKey::Experience), Some(&2));

        let carol = &outcome.eliminated[0];
        assert!(carol.eliminated);
        assert_eq!(carol.elimination_reason.as_deref(), Some("Experience 45% < min 60%"));
    }

    #[test]
    fn test_single_candidate_scenario() {
        let config = ThresholdConfig::default()
            .with(DimensionKey::Experience, Threshold::enabled(60))
            .unwrap();
        let outcome = ThresholdEliminator::apply(vec![candidate("x", "Xavier", [45, 90, 90, 90, 90])], &config);

        assert_eq!(outcome.record.count, 1);
        assert_eq!(outcome.record.candidates[0].reason, "Experience 45% < min 60%");
        let expected: BTreeMap<DimensionKey, usize> = [(DimensionKey::Experience, 1)].into_iter().collect();
        assert_eq!(outcome.record.breakdown, expected);
    }

    #[test]
    fn test_multiple_thresholds_first_failure_wins() {
        let config = ThresholdConfig::default()
            .with(DimensionKey::Experience, Threshold::enabled(40))
            .unwrap()
            .with(DimensionKey::Skills, Threshold::enabled(55))
            .unwrap();
        let outcome = ThresholdEliminator::apply(pool(), &config);

        assert_eq!(names(&outcome.survivors), vec!["Alice High", "Bob Medium"]);
        // Carol fails skills only; Dave fails both but experience comes first
        assert_eq!(outcome.record.candidates[0].reason, "Skills 50% < min 55%");
        assert_eq!(outcome.record.candidates[1].reason, "Experience 30% < min 40%");
        assert_eq!(
            outcome.record.candidates[1].failing_dimensions,
            vec![DimensionKey::Experience, DimensionKey::Skills]
        );
        assert_eq!(outcome.record.breakdown.get(&DimensionKey::Experience), Some(&1));
        assert_eq!(outcome.record.breakdown.get(&DimensionKey::Skills), Some(&1));
        assert_eq!(outcome.record.full_breakdown().get(&DimensionKey::Skills), Some(&2));
    }

    #[test]
    fn test_disabled_threshold_ignored() {
        let config = ThresholdConfig::default()
            .with(DimensionKey::Experience, Threshold { enabled: false, minimum: 100 })
            .unwrap()
            .with(DimensionKey::Skills, Threshold::enabled(40))
            .unwrap();
        let outcome = ThresholdEliminator::apply(pool(), &config);

        assert_eq!(outcome.record.count, 1);
        assert_eq!(outcome.record.candidates[0].name, "Dave VeryLow");
    }

    #[test]
    fn test_score_equal_to_minimum_survives() {
        let config = ThresholdConfig::default()
            .with(DimensionKey::Positions, Threshold::enabled(50))
            .unwrap();
        let outcome = ThresholdEliminator::apply(pool(), &config);
        assert!(names(&outcome.survivors).contains(&"Bob Medium"));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ThresholdConfig =
            serde_json::from_str(r#"{"experience": {"enabled": true, "minimum": 60}}"#).unwrap();
        assert_eq!(config.get(DimensionKey::Experience), Threshold::enabled(60));
        assert_eq!(config.get(DimensionKey::Skills), Threshold::default());
        assert!(config.any_enabled());
    }

    #[test]
    fn test_minimum_above_hundred_rejected() {
        let result = ThresholdConfig::default().with(DimensionKey::Skills, Threshold::enabled(101));
        assert!(matches!(result, Err(RankerError::Configuration(_))));
    }

    proptest! {
        #[test]
        fn prop_disabled_config_keeps_everyone(
            scores in prop::collection::vec(prop::array::uniform5(0i64..=100), 0..20),
        ) {
            let candidates: Vec<Candidate> = scores
                .into_iter()
                .enumerate()
                .map(|(i, s)| candidate(&format!("c{}", i), &format!("Candidate {}", i), s))
                .collect();
            let outcome = ThresholdEliminator::apply(candidates.clone(), &ThresholdConfig::default());
            prop_assert_eq!(outcome.record.count, 0);
            prop_assert_eq!(outcome.survivors, candidates);
        }

        #[test]
        fn prop_below_minimum_is_eliminated_with_details(
            score in 0i64..100,
            gap in 1i64..=100,
        ) {
            let minimum = (score + gap).min(100) as u8;
            let config = ThresholdConfig::default()
                .with(DimensionKey::Projects, Threshold::enabled(minimum))
                .unwrap();
            let outcome = ThresholdEliminator::apply(
                vec![candidate("p", "Pat", [100, 100, score, 100, 100])],
                &config,
            );
            prop_assert_eq!(outcome.record.count, 1);
            let reason = &outcome.record.candidates[0].reason;
            prop_assert!(reason.contains("Projects"));
            let score_pct = format!("{}%", score);
            let minimum_pct = format!("{}%", minimum);
            prop_assert!(reason.contains(&score_pct));
            prop_assert!(reason.contains(&minimum_pct));
        }
    }
}
