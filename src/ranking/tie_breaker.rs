//! Deterministic ordering of candidates that share a match score

use crate::ranking::candidate::Candidate;
use crate::ranking::dimension::{DimensionKey, Priorities};
use crate::ranking::weights::WeightVector;
use std::cmp::Ordering;

/// What separated two tied candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decider {
    /// First dimension (in weight order) where the scores differ, with its
    /// position in that order
    Dimension { key: DimensionKey, position: usize },
    Name,
    Id,
}

pub struct TieBreaker<'a> {
    order: Vec<DimensionKey>,
    weights: WeightVector,
    priorities: &'a Priorities,
}

impl<'a> TieBreaker<'a> {
    pub fn new(weights: &WeightVector, priorities: &'a Priorities) -> Self {
        Self {
            order: weights.by_weight_desc(),
            weights: *weights,
            priorities,
        }
    }

    /// Heavier dimensions first (higher score wins), then name, then id
    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        self.order
            .iter()
            .fold(Ordering::Equal, |acc, key| {
                acc.then_with(|| b.score(*key).cmp(&a.score(*key)))
            })
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }

    pub fn decider(&self, a: &Candidate, b: &Candidate) -> Decider {
        if let Some((position, key)) = self
            .order
            .iter()
            .enumerate()
            .find(|(_, key)| a.score(**key) != b.score(**key))
        {
            return Decider::Dimension { key: *key, position };
        }
        if a.name != b.name {
            Decider::Name
        } else {
            Decider::Id
        }
    }

    /// Order a tied group and annotate every member with the reason for its
    /// placement relative to its neighbor.
    pub fn resolve(&self, mut group: Vec<Candidate>) -> Vec<Candidate> {
        group.sort_by(|a, b| self.compare(a, b));
        if group.len() < 2 {
            return group;
        }

        let last = group.len() - 1;
        let reasons: Vec<String> = (0..group.len())
            .map(|i| {
                if i < last {
                    self.reason(&group[i], &group[i + 1], true)
                } else {
                    self.reason(&group[i], &group[i - 1], false)
                }
            })
            .collect();

        for (candidate, reason) in group.iter_mut().zip(reasons) {
            candidate.tie_breaker_applied = true;
            candidate.tie_breaker_reason = Some(reason);
        }
        group
    }

    fn reason(&self, subject: &Candidate, other: &Candidate, above: bool) -> String {
        let (higher, lower) = if above { (subject, other) } else { (other, subject) };
        let direction = if above { "above" } else { "below" };

        match self.decider(higher, lower) {
            Decider::Dimension { key, position } => {
                let strength = if above { "stronger" } else { "weaker" };
                let mut reason = format!(
                    "Ranked {} {} due to {} {} score ({}% vs {}%), {}",
                    direction,
                    other.name,
                    strength,
                    key.label(),
                    subject.score(key),
                    other.score(key),
                    self.describe_position(key, position)
                );
                if position > 0 {
                    let tied: Vec<&str> = self.order[..position].iter().map(|k| k.label()).collect();
                    reason.push_str(&format!("; tied on {}", tied.join(", ")));
                }
                reason
            }
            Decider::Name => format!(
                "Ranked {} {} alphabetically by name; all weighted dimension scores are equal",
                direction, other.name
            ),
            Decider::Id => format!(
                "Ranked {} {} by candidate id ({} vs {}); scores and names are identical",
                direction, other.name, subject.id, other.id
            ),
        }
    }

    fn describe_position(&self, key: DimensionKey, position: usize) -> String {
        let weight = self.weights.get(key);
        let shares_weight = self
            .order
            .iter()
            .any(|other| *other != key && self.weights.get(*other) == weight);

        let rank = match position {
            _ if shares_weight => "an equally weighted".to_string(),
            0 => "the highest-weighted".to_string(),
            1 => "the 2nd highest-weighted".to_string(),
            2 => "the 3rd highest-weighted".to_string(),
            n => format!("the {}th highest-weighted", n + 1),
        };
        if self.priorities.is_critical(key) {
            format!("{} CRITICAL dimension", rank)
        } else {
            format!("{} dimension", rank)
        }
    }
}
