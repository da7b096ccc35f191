//! Stability model.
//!
//! Stability is a bounded scalar integrated once per tick. Each signal adds or
//! removes a fixed rate scaled by the tick interval:
//!
//! | signal                              | effect per second       |
//! |-------------------------------------|-------------------------|
//! | service coverage                    | `+service_per_second`   |
//! | population above job capacity       | `-unemployment_penalty` |
//! | pollution above threshold           | `-pollution_penalty`    |
//! | power demand above supply           | `-power_deficit_penalty`|
//!
//! The result is clamped to `[0, 100]`.

use serde::{Deserialize, Serialize};

use crate::config::StabilityConfig;
use crate::game::economy::Aggregates;

/// Lowest stability value.
pub const MIN_STABILITY: f64 = 0.0;

/// Highest stability value.
pub const MAX_STABILITY: f64 = 100.0;

/// Per-signal contributions of one stability update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityChange {
    /// Gain from service coverage.
    pub service: f64,
    /// Loss from unemployment (non-positive).
    pub unemployment: f64,
    /// Loss from pollution (non-positive).
    pub pollution: f64,
    /// Loss from power deficit (non-positive).
    pub power: f64,
}

impl StabilityChange {
    /// Sum of all contributions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.service + self.unemployment + self.pollution + self.power
    }
}

/// Clamp a stability value to `[0, 100]`. `NaN` maps to 0.
#[must_use]
pub fn clamp_stability(value: f64) -> f64 {
    if value.is_nan() {
        MIN_STABILITY
    } else {
        value.clamp(MIN_STABILITY, MAX_STABILITY)
    }
}

/// Contributions for one tick.
#[must_use]
pub fn stability_change(
    totals: &Aggregates,
    service_covered: bool,
    config: &StabilityConfig,
) -> StabilityChange {
    let dt = config.update_interval_secs;
    let mut change = StabilityChange::default();

    if service_covered {
        change.service = config.service_per_second * dt;
    }
    if totals.population > totals.job_capacity {
        change.unemployment = -config.unemployment_penalty * dt;
    }
    if totals.pollution > config.pollution_threshold {
        change.pollution = -config.pollution_penalty * dt;
    }
    if totals.has_power_deficit() {
        change.power = -config.power_deficit_penalty * dt;
    }

    change
}

/// Apply one tick to `current` and clamp.
#[must_use]
pub fn next_stability(current: f64, change: &StabilityChange) -> f64 {
    clamp_stability(current + change.total())
}


/// Formal verification proofs using Kani.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Prove that clamping always lands inside the stability range.
    #[kani::proof]
    fn prove_clamp_in_range() {
        let value: f64 = kani::any();
        let clamped = clamp_stability(value);
        assert!((MIN_STABILITY..=MAX_STABILITY).contains(&clamped));
    }
}
