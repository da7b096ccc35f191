//! Per-building status flags shown above buildings by a client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::game::catalog::ROAD;
use crate::game::map::Coord;
use crate::game::state::SimulationState;

/// A condition worth flagging on a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFlag {
    /// No adjacent road.
    NoRoadAccess,
    /// City-wide power demand exceeds supply.
    MissingPower,
    /// A next level exists and the city can pay for it.
    Upgradable,
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoRoadAccess => "no road access",
            Self::MissingPower => "missing power",
            Self::Upgradable => "upgradable",
        })
    }
}

/// Flags for the building at `coord`. Empty tiles and roads have none.
///
/// # Errors
///
/// Returns [`SimError::OutOfBounds`](crate::SimError::OutOfBounds) outside the grid.
pub fn building_status(state: &SimulationState, coord: Coord) -> SimResult<Vec<StatusFlag>> {
    let tile = state.grid().get(coord)?;
    let Some(building) = tile.building.as_ref().filter(|b| b.kind != ROAD) else {
        return Ok(Vec::new());
    };

    let mut flags = Vec::new();
    if !tile.connected {
        flags.push(StatusFlag::NoRoadAccess);
    }
    let totals = state.totals();
    if totals.has_power_deficit() {
        flags.push(StatusFlag::MissingPower);
    }
    let upgrade = state
        .catalog()
        .level_spec(&building.kind, building.level)
        .ok()
        .and_then(|spec| spec.upgrade());
    if upgrade.is_some_and(|(_, cost)| state.credits() >= cost) {
        flags.push(StatusFlag::Upgradable);
    }

    Ok(flags)
}

/// Every building with at least one flag, in row-major order.
#[must_use]
pub fn flagged_buildings(state: &SimulationState) -> Vec<(Coord, Vec<StatusFlag>)> {
    state
        .grid()
        .buildings()
        .filter_map(|(coord, _)| {
            let flags = building_status(state, coord).ok()?;
            (!flags.is_empty()).then_some((coord, flags))
        })
        .collect()
}
