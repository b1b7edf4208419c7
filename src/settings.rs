//! Player overrides for factors and difficulty
//!
//! Values arrive from a form as untrusted text. Anything non-numeric is
//! ignored, numeric values are clamped into range, and the factor pair is only
//! replaced when both numbers are valid.

use serde::{Deserialize, Serialize};

use crate::sim::state::{Difficulty, FactorPair};

/// Accepted ranges (inclusive)
pub const SPAWN_INTERVAL_RANGE: (u64, u64) = (400, 4000);
pub const FALL_DURATION_RANGE: (u64, u64) = (2000, 12000);
pub const TARGET_CORRECT_RANGE: (u32, u32) = (3, 12);
pub const MIN_FACTOR: i64 = 2;

/// Raw settings form values; `None` means blank or non-numeric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsInput {
    pub number_a: Option<i64>,
    pub number_b: Option<i64>,
    pub spawn_interval_ms: Option<i64>,
    pub fall_duration_ms: Option<i64>,
    pub target_correct_per_level: Option<i64>,
}

fn parse_field(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn clamp_ms(value: i64, (lo, hi): (u64, u64)) -> u64 {
    value.clamp(lo as i64, hi as i64) as u64
}

fn clamp_count(value: i64, (lo, hi): (u32, u32)) -> u32 {
    value.clamp(i64::from(lo), i64::from(hi)) as u32
}

impl SettingsInput {
    /// Parse the five form fields
    pub fn parse(number_a: &str, number_b: &str, spawn: &str, fall: &str, target: &str) -> Self {
        Self {
            number_a: parse_field(number_a),
            number_b: parse_field(number_b),
            spawn_interval_ms: parse_field(spawn),
            fall_duration_ms: parse_field(fall),
            target_correct_per_level: parse_field(target),
        }
    }

    /// The factor pair, if both values are present and at least 2
    pub fn factors(&self) -> Option<FactorPair> {
        let a = u32::try_from(self.number_a?).ok()?;
        let b = u32::try_from(self.number_b?).ok()?;
        FactorPair::new(a, b)
    }

    /// Apply onto the live values, keeping whatever is invalid or missing
    pub fn apply(&self, factors: &mut FactorPair, difficulty: &mut Difficulty) {
        match self.factors() {
            Some(pair) => *factors = pair,
            None if self.number_a.is_some() || self.number_b.is_some() => {
                log::warn!(
                    "Ignoring factor pair {:?}/{:?} (both must be >= {})",
                    self.number_a,
                    self.number_b,
                    MIN_FACTOR
                );
            }
            None => {}
        }
        if let Some(spawn) = self.spawn_interval_ms {
            difficulty.spawn_interval_ms = clamp_ms(spawn, SPAWN_INTERVAL_RANGE);
        }
        if let Some(fall) = self.fall_duration_ms {
            difficulty.fall_duration_ms = clamp_ms(fall, FALL_DURATION_RANGE);
        }
        if let Some(target) = self.target_correct_per_level {
            difficulty.target_correct_per_level = clamp_count(target, TARGET_CORRECT_RANGE);
        }
    }
}
