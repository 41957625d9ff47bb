//! Ordering survivors by match score and assigning dense ranks

use crate::ranking::candidate::Candidate;
use crate::ranking::dimension::Priorities;
use crate::ranking::tie_breaker::TieBreaker;
use crate::ranking::weights::WeightVector;
use log::{debug, info};
use std::ops::Range;

pub struct Ranker<'a> {
    tie_breaker: TieBreaker<'a>,
}

impl<'a> Ranker<'a> {
    pub fn new(weights: &WeightVector, priorities: &'a Priorities) -> Self {
        Self {
            tie_breaker: TieBreaker::new(weights, priorities),
        }
    }

    /// Sort by match score descending, break exact ties, then number the
    /// result 1..=N. Two tied candidates still get consecutive ranks.
    pub fn rank(&self, mut survivors: Vec<Candidate>) -> Vec<Candidate> {
        survivors.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        let groups = tie_groups(&survivors);
        debug!("Found {} tie group(s) among {} candidates", groups.len(), survivors.len());

        let mut ranked = Vec::with_capacity(survivors.len());
        let mut remaining = survivors.into_iter();
        let mut position = 0;

        for group in &groups {
            ranked.extend(remaining.by_ref().take(group.start - position).map(untied));
            let tied: Vec<Candidate> = remaining.by_ref().take(group.len()).collect();
            ranked.extend(self.tie_breaker.resolve(tied));
            position = group.end;
        }
        ranked.extend(remaining.map(untied));

        for (index, candidate) in ranked.iter_mut().enumerate() {
            candidate.rank = Some(index + 1);
        }

        info!("Ranked {} candidates ({} tie group(s) resolved)", ranked.len(), groups.len());
        ranked
    }
}

fn untied(mut candidate: Candidate) -> Candidate {
    candidate.tie_breaker_applied = false;
    candidate.tie_breaker_reason = None;
    candidate
}

/// Index ranges of runs (length >= 2) sharing a match score in a list
/// already sorted by score
pub fn tie_groups(sorted: &[Candidate]) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for end in 1..=sorted.len() {
        if end == sorted.len() || sorted[end].match_score != sorted[start].match_score {
            if end - start >= 2 {
                groups.push(start..end);
            }
            start = end;
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::aggregator::ScoreAggregator;
    use crate::ranking::dimension::{DimensionKey, DimensionMap, Priority};
    use proptest::prelude::*;

    fn scored(id: &str, name: &str, values: [u8; 5], weights: &WeightVector) -> Candidate {
        let mut candidate = Candidate::new(id, name, None, DimensionMap::from_fn(|key| values[key as usize]));
        candidate.match_score = ScoreAggregator::score(&candidate.scores, weights);
        candidate
    }

    #[test]
    fn test_sorted_descending_with_dense_ranks() {
        let w = WeightVector::default();
        let priorities = Priorities::default();
        let ranked = Ranker::new(&w, &priorities).rank(vec![
            scored("c", "Carol", [50; 5], &w),
            scored("a", "Alice", [90; 5], &w),
            scored("b", "Bob", [70; 5], &w),
        ]);

        let summary: Vec<(&str, Option<usize>)> = ranked.iter().map(|c| (c.id.as_str(), c.rank)).collect();
        assert_eq!(summary, vec![("a", Some(1)), ("b", Some(2)), ("c", Some(3))]);
        assert!(ranked.iter().all(|c| !c.tie_breaker_applied));
    }

    #[test]
    fn test_tied_pair_resolved_on_skills() {
        let w = WeightVector::new(DimensionMap::from_fn(|key| match key {
            DimensionKey::Skills => 40,
            _ => 15,
        }))
        .unwrap();
        let mut priorities = Priorities::default();
        priorities[DimensionKey::Skills] = Priority::Critical;

        let bob = scored("b", "Bob", [92, 90, 92, 91, 92], &w);
        let alice = scored("a", "Alice", [89, 94, 89, 89, 89], &w);
        let leader = scored("l", "Lee", [99; 5], &w);
        assert_eq!(bob.match_score, 91);
        assert_eq!(alice.match_score, 91);

        let ranked = Ranker::new(&w, &priorities).rank(vec![bob, leader, alice]);

        assert_eq!(ranked[0].id, "l");
        assert!(!ranked[0].tie_breaker_applied);
        assert_eq!(ranked[1].id, "a");
        assert_eq!(ranked[1].rank, Some(2));
        assert_eq!(ranked[2].id, "b");
        assert_eq!(ranked[2].rank, Some(3));
        let reason = ranked[1].tie_breaker_reason.as_deref().unwrap();
        assert!(reason.contains("Skills score (94% vs 90%)"));
        assert!(reason.contains("CRITICAL"));
    }

    #[test]
    fn test_tie_groups() {
        let w = WeightVector::default();
        let sorted = vec![
            scored("a", "A", [90; 5], &w),
            scored("b", "B", [90; 5], &w),
            scored("c", "C", [80; 5], &w),
            scored("d", "D", [70; 5], &w),
            scored("e", "E", [70; 5], &w),
            scored("f", "F", [70; 5], &w),
        ];
        assert_eq!(tie_groups(&sorted), vec![0..2, 3..6]);
        assert!(tie_groups(&[]).is_empty());
    }

    #[test]
    fn test_stale_tie_annotation_cleared() {
        let w = WeightVector::default();
        let priorities = Priorities::default();
        let mut stale = scored("a", "Alice", [80; 5], &w);
        stale.tie_breaker_applied = true;
        stale.tie_breaker_reason = Some("old".to_string());

        let ranked = Ranker::new(&w, &priorities).rank(vec![stale, scored("b", "Bob", [60; 5], &w)]);
        assert!(!ranked[0].tie_breaker_applied);
        assert_eq!(ranked[0].tie_breaker_reason, None);
    }

    proptest! {
        #[test]
        fn prop_ranks_are_dense(pool in prop::collection::vec(prop::array::uniform5(0u8..=100), 0..30)) {
            let w = WeightVector::default();
            let priorities = Priorities::default();
            let candidates: Vec<Candidate> = pool
                .into_iter()
                .enumerate()
                .map(|(i, v)| scored(&format!("c{}", i), &format!("N{}", i % 4), v, &w))
                .collect();
            let n = candidates.len();

            let ranked = Ranker::new(&w, &priorities).rank(candidates);

            let ranks: Vec<usize> = ranked.iter().filter_map(|c| c.rank).collect();
            prop_assert_eq!(ranks, (1..=n).collect::<Vec<_>>());
            prop_assert!(ranked.windows(2).all(|pair| pair[0].match_score >= pair[1].match_score));
        }
    }
}
