//! Evaluation dimensions and the fixed five-slot map keyed by them

use crate::error::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the five evaluation axes. Declaration order is the enumeration
/// order every other component iterates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKey {
    Experience,
    Skills,
    Projects,
    Positions,
    Education,
}

impl DimensionKey {
    pub const ALL: [DimensionKey; 5] = [
        DimensionKey::Experience,
        DimensionKey::Skills,
        DimensionKey::Projects,
        DimensionKey::Positions,
        DimensionKey::Education,
    ];

    /// Human-readable label used in reasons and reports
    pub fn label(self) -> &'static str {
        match self {
            DimensionKey::Experience => "Experience",
            DimensionKey::Skills => "Skills",
            DimensionKey::Projects => "Projects",
            DimensionKey::Positions => "Positions",
            DimensionKey::Education => "Education",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DimensionKey::Experience => "experience",
            DimensionKey::Skills => "skills",
            DimensionKey::Projects => "projects",
            DimensionKey::Positions => "positions",
            DimensionKey::Education => "education",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for DimensionKey {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        DimensionKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                RankerError::Configuration(format!(
                    "Unknown dimension: {}. Supported: experience, skills, projects, positions, education",
                    s
                ))
            })
    }
}

/// Total map from every [`DimensionKey`] to a value.
///
/// Serializes as a plain map (`{"experience": .., "skills": ..}`) in
/// enumeration order. Deserializing requires all five keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<DimensionKey, T>",
    into = "BTreeMap<DimensionKey, T>",
    bound(
        serialize = "T: Clone + Serialize",
        deserialize = "T: Deserialize<'de>"
    )
)]
pub struct DimensionMap<T> {
    values: [T; 5],
}

impl<T> DimensionMap<T> {
    pub fn from_fn(mut f: impl FnMut(DimensionKey) -> T) -> Self {
        Self {
            values: DimensionKey::ALL.map(&mut f),
        }
    }

    /// Iterate `(key, value)` pairs in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (DimensionKey, &T)> {
        DimensionKey::ALL.iter().copied().zip(self.values.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(DimensionKey, &T) -> U) -> DimensionMap<U> {
        DimensionMap::from_fn(|key| f(key, &self[key]))
    }

    /// Build from a possibly partial map, filling gaps with `default`
    pub fn from_partial(mut partial: BTreeMap<DimensionKey, T>, mut default: impl FnMut(DimensionKey) -> T) -> Self {
        Self::from_fn(|key| partial.remove(&key).unwrap_or_else(|| default(key)))
    }
}

impl<T: Default> Default for DimensionMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<DimensionKey> for DimensionMap<T> {
    type Output = T;

    fn index(&self, key: DimensionKey) -> &T {
        &self.values[key.index()]
    }
}

impl<T> IndexMut<DimensionKey> for DimensionMap<T> {
    fn index_mut(&mut self, key: DimensionKey) -> &mut T {
        &mut self.values[key.index()]
    }
}

impl<T> TryFrom<BTreeMap<DimensionKey, T>> for DimensionMap<T> {
    type Error = RankerError;

    fn try_from(mut map: BTreeMap<DimensionKey, T>) -> Result<Self> {
        match DimensionKey::ALL.map(|key| map.remove(&key)) {
            [Some(experience), Some(skills), Some(projects), Some(positions), Some(education)] => Ok(Self {
                values: [experience, skills, projects, positions, education],
            }),
            slots => {
                let missing: Vec<&str> = DimensionKey::ALL
                    .iter()
                    .zip(slots.iter())
                    .filter(|(_, slot)| slot.is_none())
                    .map(|(key, _)| key.as_str())
                    .collect();
                Err(RankerError::Configuration(format!(
                    "Missing dimension(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl<T> From<DimensionMap<T>> for BTreeMap<DimensionKey, T> {
    fn from(map: DimensionMap<T>) -> Self {
        DimensionKey::ALL.into_iter().zip(map.values).collect()
    }
}

/// Resolve the string keys of an externally supplied map. Unknown or
/// repeated dimensions are configuration errors.
pub fn parse_keyed<T>(raw: BTreeMap<String, T>) -> Result<BTreeMap<DimensionKey, T>> {
    let mut parsed = BTreeMap::new();
    for (name, value) in raw {
        let key: DimensionKey = name.parse()?;
        if parsed.insert(key, value).is_some() {
            return Err(RankerError::Configuration(format!(
                "Dimension given twice: {}",
                key.as_str()
            )));
        }
    }
    Ok(parsed)
}

/// Job-inferred importance of a dimension. Only phrases explanations, never
/// changes numeric weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    #[default]
    Important,
    NiceToHave,
    LowPriority,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Critical => "CRITICAL",
            Priority::Important => "IMPORTANT",
            Priority::NiceToHave => "NICE_TO_HAVE",
            Priority::LowPriority => "LOW_PRIORITY",
        };
        write!(f, "{}", label)
    }
}

pub type Priorities = DimensionMap<Priority>;

impl Priorities {
    /// Fill a partial priority map; unspecified dimensions are IMPORTANT
    pub fn from_partial_priorities(partial: BTreeMap<DimensionKey, Priority>) -> Self {
        DimensionMap::from_partial(partial, |_| Priority::Important)
    }

    pub fn critical(&self) -> Vec<DimensionKey> {
        self.iter()
            .filter(|(_, priority)| **priority == Priority::Critical)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn is_critical(&self, key: DimensionKey) -> bool {
        self[key] == Priority::Critical
    }
}
