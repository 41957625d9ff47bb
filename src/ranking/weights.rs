//! Weight vector and the fixed-sum redistribution used when one weight changes

use crate::error::{RankerError, Result};
use crate::ranking::dimension::{parse_keyed, DimensionKey, DimensionMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const WEIGHT_TOTAL: u32 = 100;
pub const DEFAULT_WEIGHT: u8 = 20;

/// Percentage weight per dimension. Always sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<DimensionKey, u8>", into = "BTreeMap<DimensionKey, u8>")]
pub struct WeightVector(DimensionMap<u8>);

impl WeightVector {
    /// Validate a complete weight map. Rejects anything not summing to 100.
    pub fn new(weights: DimensionMap<u8>) -> Result<Self> {
        if let Some((key, value)) = weights.iter().find(|(_, value)| **value > 100) {
            return Err(RankerError::Configuration(format!(
                "Weight for {} is {}%, must be between 0 and 100",
                key.as_str(),
                value
            )));
        }

        let total: u32 = weights.values().map(|w| u32::from(*w)).sum();
        if total != WEIGHT_TOTAL {
            return Err(RankerError::Configuration(format!(
                "Weights must sum to 100, got {}",
                total
            )));
        }

        Ok(Self(weights))
    }

    pub fn get(&self, key: DimensionKey) -> u8 {
        self.0[key]
    }

    pub fn as_map(&self) -> &DimensionMap<u8> {
        &self.0
    }

    pub fn total(&self) -> u32 {
        self.0.values().map(|w| u32::from(*w)).sum()
    }

    /// Dimensions with a non-zero weight, heaviest first. Equal weights keep
    /// enumeration order.
    pub fn by_weight_desc(&self) -> Vec<DimensionKey> {
        let mut keys: Vec<DimensionKey> = DimensionKey::ALL
            .into_iter()
            .filter(|key| self.get(*key) > 0)
            .collect();
        keys.sort_by(|a, b| self.get(*b).cmp(&self.get(*a)));
        keys
    }

    /// Scale an arbitrary (possibly partial) weight map to sum to 100.
    ///
    /// Missing dimensions count as 20. The rounding residual lands on
    /// `experience`, the first dimension.
    pub fn rescale(raw: &BTreeMap<DimensionKey, u32>) -> Result<Self> {
        // Summed in u64: five u32 values cannot overflow it
        let raw = DimensionMap::from_fn(|key| {
            raw.get(&key).map_or(u64::from(DEFAULT_WEIGHT), |w| u64::from(*w))
        });
        let total: u64 = raw.values().sum();
        if total == 0 {
            return Err(RankerError::Configuration(
                "Cannot rescale weights that are all zero".to_string(),
            ));
        }
        if total == u64::from(WEIGHT_TOTAL) {
            return Self::new(raw.map(|_, w| *w as u8));
        }

        let mut scaled = raw.map(|_, w| round_half_up(*w * u64::from(WEIGHT_TOTAL), total) as i32);
        settle_residual(&mut scaled, &DimensionKey::ALL);
        Self::new(scaled.map(|_, w| *w as u8))
    }

    /// Validate a weight map read from a request file. Unknown dimensions
    /// and values outside 0..=100 are configuration errors.
    pub fn from_raw(raw: BTreeMap<String, i64>) -> Result<Self> {
        let mut weights = BTreeMap::new();
        for (key, value) in parse_keyed(raw)? {
            let weight = u8::try_from(value)
                .ok()
                .filter(|w| u32::from(*w) <= WEIGHT_TOTAL)
                .ok_or_else(|| {
                    RankerError::Configuration(format!(
                        "Weight for {} is {}%, must be between 0 and 100",
                        key.as_str(),
                        value
                    ))
                })?;
            weights.insert(key, weight);
        }
        Self::try_from(weights)
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self(DimensionMap::from_fn(|_| DEFAULT_WEIGHT))
    }
}

impl TryFrom<BTreeMap<DimensionKey, u8>> for WeightVector {
    type Error = RankerError;

    fn try_from(map: BTreeMap<DimensionKey, u8>) -> Result<Self> {
        Self::new(DimensionMap::try_from(map)?)
    }
}

impl From<WeightVector> for BTreeMap<DimensionKey, u8> {
    fn from(weights: WeightVector) -> Self {
        weights.0.into()
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(key, weight)| format!("{} {}%", key.label(), weight))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Keeps the weight vector at 100 when a single dimension is moved.
pub struct WeightNormalizer;

impl WeightNormalizer {
    /// Set `changed` to `new_value` and spread the remainder over the other
    /// four dimensions in proportion to their previous weights.
    pub fn adjust(current: &WeightVector, changed: DimensionKey, new_value: u8) -> WeightVector {
        let new_value = new_value.min(100);
        let remaining = WEIGHT_TOTAL - u32::from(new_value);
        let others: Vec<DimensionKey> = DimensionKey::ALL
            .into_iter()
            .filter(|key| *key != changed)
            .collect();
        let others_total: u32 = others.iter().map(|key| u32::from(current.get(*key))).sum();

        let mut next = current.as_map().map(|_, w| i32::from(*w));
        next[changed] = i32::from(new_value);

        for key in &others {
            let share = if others_total > 0 {
                round_half_up(
                    u64::from(current.get(*key)) * u64::from(remaining),
                    u64::from(others_total),
                )
            } else {
                round_half_up(u64::from(remaining), others.len() as u64)
            };
            next[*key] = share as i32;
        }

        settle_residual(&mut next, &others);

        let adjusted = WeightVector(next.map(|_, w| *w as u8));
        debug_assert_eq!(adjusted.total(), WEIGHT_TOTAL);
        adjusted
    }
}

/// `round(numerator / denominator)` with halves rounded up
fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Push `100 - total` onto the first key of `order`. A key never drops
/// below zero; whatever it cannot absorb moves on to the next key.
fn settle_residual(values: &mut DimensionMap<i32>, order: &[DimensionKey]) {
    let mut residual = WEIGHT_TOTAL as i32 - values.values().sum::<i32>();
    for key in order {
        if residual == 0 {
            break;
        }
        let adjusted = (values[*key] + residual).clamp(0, 100);
        residual -= adjusted - values[*key];
        values[*key] = adjusted;
    }
}
