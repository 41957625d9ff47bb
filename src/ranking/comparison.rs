//! Head-to-head comparison of two scored candidates

use crate::error::{RankerError, Result};
use crate::ranking::candidate::Candidate;
use crate::ranking::dimension::{DimensionKey, DimensionMap, Priorities};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    #[serde(rename = "candidate_1")]
    Candidate1,
    #[serde(rename = "candidate_2")]
    Candidate2,
    Tie,
}

impl Winner {
    fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Winner::Candidate1,
            Ordering::Less => Winner::Candidate2,
            Ordering::Equal => Winner::Tie,
        }
    }

    /// The same outcome seen with the two candidates swapped
    pub fn swapped(self) -> Self {
        match self {
            Winner::Candidate1 => Winner::Candidate2,
            Winner::Candidate2 => Winner::Candidate1,
            Winner::Tie => Winner::Tie,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Winner::Candidate1 => "candidate_1",
            Winner::Candidate2 => "candidate_2",
            Winner::Tie => "tie",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub overall_winner: Winner,
    pub dimension_winners: DimensionMap<Winner>,
    pub explanation: String,
    pub key_differences: Vec<String>,
}

impl ComparisonResult {
    pub fn wins(&self, side: Winner) -> usize {
        self.dimension_winners.values().filter(|w| **w == side).count()
    }
}

pub struct ComparativeAnalyzer;

impl ComparativeAnalyzer {
    /// Compare exactly two candidates picked from a selection
    pub fn compare_selection(selection: &[&Candidate], priorities: &Priorities) -> Result<ComparisonResult> {
        match selection {
            [a, b] if a.id == b.id => Err(RankerError::ComparisonInput(format!(
                "Cannot compare candidate {} with itself",
                a.id
            ))),
            [a, b] => Ok(Self::compare(a, b, priorities)),
            other => Err(RankerError::ComparisonInput(format!(
                "Comparison requires exactly 2 candidates, got {}",
                other.len()
            ))),
        }
    }

    pub fn compare(a: &Candidate, b: &Candidate, priorities: &Priorities) -> ComparisonResult {
        let dimension_winners = DimensionMap::from_fn(|key| Winner::from_ordering(a.score(key).cmp(&b.score(key))));
        let overall_winner = Winner::from_ordering(a.match_score.cmp(&b.match_score));

        let key_differences = DimensionKey::ALL
            .iter()
            .map(|key| {
                format!(
                    "{}: {} {}% vs {} {}%",
                    key.label(),
                    a.name,
                    a.score(*key),
                    b.name,
                    b.score(*key)
                )
            })
            .collect();

        let explanation = explain(a, b, overall_winner, &dimension_winners, priorities);

        ComparisonResult {
            overall_winner,
            dimension_winners,
            explanation,
            key_differences,
        }
    }
}

fn explain(
    a: &Candidate,
    b: &Candidate,
    overall: Winner,
    dimension_winners: &DimensionMap<Winner>,
    priorities: &Priorities,
) -> String {
    let wins = |side: Winner| dimension_winners.values().filter(|w| **w == side).count();
    let critical = priorities.critical();
    let critical_won_by = |side: Winner| -> Vec<&'static str> {
        critical
            .iter()
            .filter(|key| dimension_winners[**key] == side)
            .map(|key| key.label())
            .collect()
    };

    let (winner, loser, winner_side, loser_side) = match overall {
        Winner::Candidate1 | Winner::Tie => (a, b, Winner::Candidate1, Winner::Candidate2),
        Winner::Candidate2 => (b, a, Winner::Candidate2, Winner::Candidate1),
    };

    let mut parts = Vec::new();
    if overall == Winner::Tie {
        parts.push(format!(
            "{} and {} are tied overall at {}%.",
            a.name, b.name, a.match_score
        ));
        parts.push(format!(
            "{} wins in {} {}, {} in {}, with {} even.",
            a.name,
            wins(Winner::Candidate1),
            plural(wins(Winner::Candidate1), "dimension"),
            b.name,
            wins(Winner::Candidate2),
            wins(Winner::Tie)
        ));
    } else {
        parts.push(format!(
            "{} ranks higher overall with a {}% score advantage.",
            winner.name,
            winner.match_score.abs_diff(loser.match_score)
        ));
        parts.push(format!(
            "{} wins in {} {}, while {} leads in {}.",
            winner.name,
            wins(winner_side),
            plural(wins(winner_side), "dimension"),
            loser.name,
            wins(loser_side)
        ));
    }

    if critical.is_empty() {
        parts.push("No CRITICAL dimensions were identified for this role.".to_string());
        return parts.join(" ");
    }

    let favoring_winner = critical_won_by(winner_side);
    let favoring_loser = critical_won_by(loser_side);
    if overall == Winner::Tie {
        if !favoring_winner.is_empty() {
            parts.push(format!("CRITICAL dimensions favoring {}: {}.", a.name, favoring_winner.join(", ")));
        }
        if !favoring_loser.is_empty() {
            parts.push(format!("CRITICAL dimensions favoring {}: {}.", b.name, favoring_loser.join(", ")));
        }
        if favoring_winner.is_empty() && favoring_loser.is_empty() {
            parts.push("Both are even on every CRITICAL dimension.".to_string());
        }
    } else if !favoring_winner.is_empty() {
        parts.push(format!(
            "The weighted scoring favors {}'s stronger performance in CRITICAL dimensions ({}).",
            winner.name,
            favoring_winner.join(", ")
        ));
    } else if !favoring_loser.is_empty() {
        parts.push(format!(
            "{} leads on CRITICAL dimensions ({}), but the weighted composite favors {}.",
            loser.name,
            favoring_loser.join(", "),
            winner.name
        ));
    } else {
        parts.push("Neither candidate leads on any CRITICAL dimension.".to_string());
    }

    parts.join(" ")
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
