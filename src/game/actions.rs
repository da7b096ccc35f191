//! Intents: the requests external clients issue against the simulation.
//!
//! The JSON form matches what an automated agent emits, for example
//! `{"action": "build", "type": "road", "x": 8, "y": 8, "reasoning": "..."}`.
//! Unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimResult;
use crate::game::state::SimulationState;

/// A single request against the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Intent {
    /// Place a new level-1 building.
    Build {
        /// Catalog key.
        #[serde(rename = "type")]
        kind: String,
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
    /// Raise a building one level.
    Upgrade {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
    /// Remove a building for a partial refund.
    Demolish {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
    /// Do nothing this cycle.
    Wait,
}

impl Intent {
    /// Build intent helper.
    #[must_use]
    pub fn build(kind: &str, x: i64, y: i64) -> Self {
        Self::Build {
            kind: kind.to_string(),
            x,
            y,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build { kind, x, y } => write!(f, "build {kind} at ({x}, {y})"),
            Self::Upgrade { x, y } => write!(f, "upgrade ({x}, {y})"),
            Self::Demolish { x, y } => write!(f, "demolish ({x}, {y})"),
            Self::Wait => write!(f, "wait"),
        }
    }
}

/// Result of a successfully applied intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum IntentOutcome {
    /// A building was placed.
    Built {
        /// Catalog key.
        kind: String,
        /// Credits spent.
        cost: u64,
    },
    /// A building gained a level.
    Upgraded {
        /// Catalog key.
        kind: String,
        /// Level after the upgrade.
        level: u8,
        /// Credits spent.
        cost: u64,
    },
    /// A building was removed.
    Demolished {
        /// Catalog key.
        kind: String,
        /// Level the building had.
        level: u8,
        /// Credits returned.
        refund: u64,
    },
    /// Nothing happened.
    Waited,
}

impl IntentOutcome {
    /// Signed change to the credit balance.
    #[must_use]
    pub fn credits_delta(&self) -> i64 {
        let signed = |amount: u64| i64::try_from(amount).unwrap_or(i64::MAX);
        match self {
            Self::Built { cost, .. } | Self::Upgraded { cost, .. } => -signed(*cost),
            Self::Demolished { refund, .. } => signed(*refund),
            Self::Waited => 0,
        }
    }
}

/// Apply an intent to the state.
///
/// # Errors
///
/// Returns the [`SimError`](crate::SimError) of the underlying operation. The
/// state is unchanged on error.
pub fn apply_intent(state: &mut SimulationState, intent: &Intent) -> SimResult<IntentOutcome> {
    let result = match intent {
        Intent::Build { kind, x, y } => {
            let coord = state.grid().coord(*x, *y)?;
            state.build(coord, kind)
        }
        Intent::Upgrade { x, y } => {
            let coord = state.grid().coord(*x, *y)?;
            state.upgrade(coord)
        }
        Intent::Demolish { x, y } => {
            let coord = state.grid().coord(*x, *y)?;
            state.demolish(coord)
        }
        Intent::Wait => Ok(IntentOutcome::Waited),
    };

    if let Err(err) = &result {
        debug!(%intent, %err, "intent rejected");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_parse_agent_build() {
        let intent: Intent = serde_json::from_str(
            r#"{"action":"build","type":"road","x":8,"y":8,"reasoning":"connect the houses"}"#,
        )
        .unwrap();
        assert_eq!(intent, Intent::build("road", 8, 8));
    }

    #[test]
    fn test_parse_other_actions() {
        let upgrade: Intent = serde_json::from_str(r#"{"action":"upgrade","x":1,"y":2}"#).unwrap();
        assert_eq!(upgrade, Intent::Upgrade { x: 1, y: 2 });
        let wait: Intent = serde_json::from_str(r#"{"action":"wait"}"#).unwrap();
        assert_eq!(wait, Intent::Wait);
        assert!(serde_json::from_str::<Intent>(r#"{"action":"teleport"}"#).is_err());
    }

    #[test]
    fn test_negative_coordinates_are_out_of_bounds() {
        let mut state = SimulationState::default();
        let err = apply_intent(&mut state, &Intent::build("road", -1, 4)).unwrap_err();
        assert_eq!(err, SimError::OutOfBounds { x: -1, y: 4 });
        assert_eq!(state.credits(), 1000);
    }

    #[test]
    fn test_apply_sequence() {
        let mut state = SimulationState::default();
        let built = apply_intent(&mut state, &Intent::build("road", 8, 8)).unwrap();
        assert_eq!(built.credits_delta(), -50);
        let removed = apply_intent(&mut state, &Intent::Demolish { x: 8, y: 8 }).unwrap();
        assert_eq!(
            removed,
            IntentOutcome::Demolished {
                kind: "road".to_string(),
                level: 1,
                refund: 12
            }
        );
        assert_eq!(apply_intent(&mut state, &Intent::Wait).unwrap(), IntentOutcome::Waited);
        assert_eq!(state.credits(), 962);
    }

    #[test]
    fn test_display() {
        assert_eq!(Intent::build("shop", 3, 4).to_string(), "build shop at (3, 4)");
        assert_eq!(Intent::Wait.to_string(), "wait");
    }
}
