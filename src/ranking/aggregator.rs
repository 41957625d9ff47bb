//! Weighted composite match score

use crate::ranking::candidate::{Candidate, CandidateScore};
use crate::ranking::dimension::DimensionKey;
use crate::ranking::weights::{WeightVector, WEIGHT_TOTAL};

pub struct ScoreAggregator;

impl ScoreAggregator {
    /// `round(sum(score * weight) / 100)`, halves rounded up
    pub fn score(scores: &CandidateScore, weights: &WeightVector) -> u8 {
        debug_assert_eq!(weights.total(), WEIGHT_TOTAL);

        let weighted: u32 = DimensionKey::ALL
            .iter()
            .map(|key| u32::from(scores[*key]) * u32::from(weights.get(*key)))
            .sum();
        let rounded = (weighted + WEIGHT_TOTAL / 2) / WEIGHT_TOTAL;
        rounded.min(100) as u8
    }

    /// Write the match score onto every candidate
    pub fn apply(candidates: &mut [Candidate], weights: &WeightVector) {
        for candidate in candidates.iter_mut() {
            candidate.match_score = Self::score(&candidate.scores, weights);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::dimension::DimensionMap;
    use proptest::prelude::*;

    fn scores(values: [u8; 5]) -> CandidateScore {
        DimensionMap::from_fn(|key| values[key as usize])
    }

    fn weights(values: [u8; 5]) -> WeightVector {
        WeightVector::new(DimensionMap::from_fn(|key| values[key as usize])).unwrap()
    }

    #[test]
    fn test_equal_weights_is_average() {
        let result = ScoreAggregator::score(&scores([95, 92, 98, 88, 85]), &WeightVector::default());
        assert_eq!(result, 92);
    }

    #[test]
    fn test_custom_weights() {
        // 90*40 + 85*20 + 80*15 + 75*15 + 70*10 = 8325 -> 83.25
        let result = ScoreAggregator::score(&scores([90, 85, 80, 75, 70]), &weights([40, 20, 15, 15, 10]));
        assert_eq!(result, 83);
    }

    #[test]
    fn test_half_rounds_up() {
        // 81*50 + 80*50 = 8050 -> 80.5
        let result = ScoreAggregator::score(&scores([81, 80, 0, 0, 0]), &weights([50, 50, 0, 0, 0]));
        assert_eq!(result, 81);
    }

    #[test]
    fn test_apply_writes_match_score() {
        let mut candidates = vec![Candidate::new("c1", "Alice", None, scores([100, 100, 100, 100, 100]))];
        ScoreAggregator::apply(&mut candidates, &WeightVector::default());
        assert_eq!(candidates[0].match_score, 100);
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_each_dimension(
            base in prop::array::uniform5(0u8..=100),
            raw_weights in prop::array::uniform5(1u32..100),
            dim in 0usize..5,
            bump in 0u8..=100,
        ) {
            let raw = DimensionKey::ALL.into_iter().zip(raw_weights).collect();
            let w = WeightVector::rescale(&raw).unwrap();

            let mut raised = base;
            raised[dim] = base[dim].saturating_add(bump).min(100);

            let before = ScoreAggregator::score(&scores(base), &w);
            let after = ScoreAggregator::score(&scores(raised), &w);
            prop_assert!(after >= before);
            prop_assert!(after <= 100);
        }
    }
}
