//! Aggregate views over a finished ranking

use crate::ranking::candidate::Candidate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreakEntry {
    pub candidate_id: String,
    pub rank: usize,
    pub match_score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TieBreakSummary {
    pub count: usize,
    pub affected_ranks: Vec<usize>,
    pub candidates: Vec<TieBreakEntry>,
}

impl TieBreakSummary {
    pub fn from_ranked(ranked: &[Candidate]) -> Self {
        let candidates: Vec<TieBreakEntry> = ranked
            .iter()
            .filter(|c| c.tie_breaker_applied)
            .map(|c| TieBreakEntry {
                candidate_id: c.id.clone(),
                rank: c.rank.unwrap_or_default(),
                match_score: c.match_score,
                reason: c.tie_breaker_reason.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            count: candidates.len(),
            affected_ranks: candidates.iter().map(|c| c.rank).collect(),
            candidates,
        }
    }
}

/// Why candidates outside the shortlist are not shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub total_in_pool: usize,
    pub ranked_count: usize,
    pub eliminated_count: usize,
    pub shortlist_size: usize,
    pub below_shortlist: usize,
    /// Lowest shortlisted score minus the average below the shortlist.
    /// Only reported when more than three candidates sit below it.
    pub average_gap: Option<u8>,
    pub explanation: String,
}

impl PoolSummary {
    pub fn new(ranked: &[Candidate], eliminated_count: usize, shortlist_size: usize) -> Self {
        let total_in_pool = ranked.len() + eliminated_count;
        let split = shortlist_size.min(ranked.len());
        let (shortlist, below) = ranked.split_at(split);

        let average_gap = if below.len() > 3 && !shortlist.is_empty() {
            let below_total: u32 = below.iter().map(|c| u32::from(c.match_score)).sum();
            let below_average = f64::from(below_total) / below.len() as f64;
            let shortlist_min = shortlist.iter().map(|c| c.match_score).min().unwrap_or(0);
            let gap = f64::from(shortlist_min) - below_average;
            (gap > 0.0).then(|| gap.round() as u8)
        } else {
            None
        };

        let mut parts = vec![format!("{} candidates in pool.", total_in_pool)];
        if eliminated_count > 0 {
            parts.push(format!("{} eliminated by thresholds.", eliminated_count));
        }
        if !below.is_empty() {
            parts.push(format!(
                "{} candidates ranked below top {}.",
                below.len(),
                shortlist_size
            ));
        }
        if let Some(gap) = average_gap {
            parts.push(format!("Average gap from top {}: {}%.", shortlist_size, gap));
        }

        Self {
            total_in_pool,
            ranked_count: ranked.len(),
            eliminated_count,
            shortlist_size,
            below_shortlist: below.len(),
            average_gap,
            explanation: parts.join(" "),
        }
    }

    /// Every candidate in the pool made the shortlist
    pub fn all_shown(&self) -> bool {
        self.eliminated_count == 0 && self.below_shortlist == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::dimension::DimensionMap;

    fn ranked(scores: &[u8]) -> Vec<Candidate> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let mut c = Candidate::new(format!("c{}", i), format!("C{}", i), None, DimensionMap::default());
                c.match_score = *score;
                c.rank = Some(i + 1);
                c
            })
            .collect()
    }

    #[test]
    fn test_tie_break_summary() {
        let mut pool = ranked(&[85, 85, 70]);
        for c in pool.iter_mut().take(2) {
            c.tie_breaker_applied = true;
            c.tie_breaker_reason = Some("reason".to_string());
        }

        let summary = TieBreakSummary::from_ranked(&pool);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.affected_ranks, vec![1, 2]);
        assert_eq!(summary.candidates[1].candidate_id, "c1");
    }

    #[test]
    fn test_pool_summary_small_pool() {
        let summary = PoolSummary::new(&ranked(&[90, 80]), 0, 6);
        assert!(summary.all_shown());
        assert_eq!(summary.explanation, "2 candidates in pool.");
    }

    #[test]
    fn test_pool_summary_with_eliminations_and_gap() {
        let summary = PoolSummary::new(&ranked(&[95, 92, 90, 88, 86, 85, 70, 68, 66, 64]), 2, 6);

        assert_eq!(summary.total_in_pool, 12);
        assert_eq!(summary.below_shortlist, 4);
        // 85 - 67
        assert_eq!(summary.average_gap, Some(18));
        assert_eq!(
            summary.explanation,
            "12 candidates in pool. 2 eliminated by thresholds. 4 candidates ranked below top 6. Average gap from top 6: 18%."
        );
    }

    #[test]
    fn test_gap_omitted_for_few_below() {
        let summary = PoolSummary::new(&ranked(&[95, 92, 90, 88, 86, 85, 70, 68]), 0, 6);
        assert_eq!(summary.below_shortlist, 2);
        assert_eq!(summary.average_gap, None);
    }
}
