//! Simulation invariants - sanity checks that detect bugs.
//!
//! No sequence of public operations should ever trip these. A violation means
//! a transition rule or a restore path is broken.

use crate::game::catalog::ROAD;
use crate::game::connectivity::resolve_connectivity;
use crate::game::economy::aggregate_grid;
use crate::game::stability::{MAX_STABILITY, MIN_STABILITY};
use crate::game::state::SimulationState;
use thiserror::Error;

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

/// Check all simulation invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &SimulationState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });
    let catalog = state.catalog();

    for (coord, building) in state.grid().buildings() {
        if building.kind == ROAD {
            if building.level != 1 {
                violation(format!(
                    "Road at ({}, {}) has level {}",
                    coord.x, coord.y, building.level
                ));
            }
            continue;
        }
        if let Err(err) = catalog.level_spec(&building.kind, building.level) {
            violation(format!("Building at ({}, {}): {err}", coord.x, coord.y));
        }
    }

    let stability = state.stability();
    if !stability.is_finite() || !(MIN_STABILITY..=MAX_STABILITY).contains(&stability) {
        violation(format!("Stability {stability} outside [0, 100]"));
    }

    let mut fresh = state.grid().clone();
    resolve_connectivity(&mut fresh);
    if &fresh != state.grid() {
        violation("Connectivity flags are stale".to_string());
    }

    let expected = aggregate_grid(&fresh, catalog);
    let stored = state.totals();
    if &expected != stored {
        violation(format!(
            "Stored totals {stored:?} differ from recomputed {expected:?}"
        ));
    }

    violations
}

/// Assert all simulation invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &SimulationState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Simulation invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &SimulationState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::{Coord, Orientation, Placement, Tile};

    fn create_valid_city() -> SimulationState {
        let mut state = SimulationState::default();
        state.build(Coord::new(8, 8), ROAD).unwrap();
        state.build(Coord::new(8, 9), "house").unwrap();
        state.build(Coord::new(0, 0), "park").unwrap();
        state
    }

    #[test]
    fn test_valid_city_passes() {
        let mut state = create_valid_city();
        assert!(check_invariants(&state).is_empty());
        state.tick();
        assert!(check_invariants(&state).is_empty());
    }

    #[test]
    fn test_violation_display() {
        let mut state = create_valid_city();
        state.set_stability_raw(f64::NAN);
        let violation = check_invariants(&state).remove(0);
        assert_eq!(
            violation.to_string(),
            format!("Invariant violation: {}", violation.message)
        );
        let source: &dyn std::error::Error = &violation;
        assert!(source.source().is_none());
    }

    #[test]
    fn test_diverging_totals_detected() {
        let mut state = create_valid_city();
        state.totals_mut().population += 1;
        let violations = check_invariants(&state);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("totals"));
    }

    #[test]
    fn test_bad_stability_detected() {
        let mut state = create_valid_city();
        state.set_stability_raw(f64::NAN);
        let violations = check_invariants(&state);
        assert!(violations[0].message.contains("Stability"));
    }

    #[test]
    fn test_unknown_building_detected() {
        let mut state = create_valid_city();
        let mut placement = Placement::new("house", Orientation::default());
        placement.level = 7;
        state
            .grid_mut()
            .set(Coord::new(3, 3), Tile::built(placement))
            .unwrap();
        let violations = check_invariants(&state);
        assert!(violations.iter().any(|v| v.message.contains("no level 7")));
    }

    #[test]
    fn test_upgraded_road_detected() {
        let mut state = create_valid_city();
        let mut road = Placement::new(ROAD, Orientation::default());
        road.level = 2;
        let mut tile = Tile::built(road);
        tile.connected = true;
        state.grid_mut().set(Coord::new(8, 8), tile).unwrap();
        let violations = check_invariants(&state);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Road at (8, 8)"));
    }

    #[test]
    fn test_stale_connectivity_detected() {
        let mut state = create_valid_city();
        state.grid_mut().set(Coord::new(8, 8), Tile::empty()).unwrap();
        let violations = check_invariants(&state);
        assert!(violations.iter().any(|v| v.message.contains("stale")));
    }
}
