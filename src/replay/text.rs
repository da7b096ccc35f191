//! Structured text summary for agent consumption.
//!
//! This format is optimized for machine readability while remaining
//! human-parseable. It lists every counter, the occupied tiles and the power
//! balance, which is all an agent needs to choose its next intent.

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use std::collections::BTreeMap;

use crate::game::{flagged_buildings, SimulationState, ROAD};
use crate::replay::render::render_map;

/// Render the state as a structured summary.
///
/// Output format:
/// ```text
/// === DAY 12 ===
///
/// STATS:
/// - Credits: 1234
/// - Population: 30/30
/// ...
///
/// OCCUPIED TILES (2 total):
/// - (8, 8): road
/// - (8, 9): house level 2
///
/// POWER:
/// - Demand: 15
/// - Supply: 0
/// - Balance: -15
///
/// MAP (17x17):
/// ...
/// ```
#[must_use]
pub fn render_summary(state: &SimulationState) -> String {
    let mut output = String::new();

    output.push_str(&format!("=== DAY {} ===\n\n", state.day()));
    render_stats(&mut output, state);
    render_counts(&mut output, state);
    render_occupied(&mut output, state);
    render_power(&mut output, state);
    render_alerts(&mut output, state);

    let grid = state.grid();
    output.push_str(&format!("MAP ({}x{}):\n", grid.width(), grid.height()));
    output.push_str(&render_map(state));

    output
}

fn render_stats(output: &mut String, state: &SimulationState) {
    output.push_str("STATS:\n");
    output.push_str(&format!("- Credits: {}\n", state.credits()));
    output.push_str(&format!(
        "- Population: {}/{}\n",
        state.population(),
        state.max_population()
    ));
    output.push_str(&format!("- Jobs: {}\n", state.job_capacity()));
    output.push_str(&format!("- Daily income: {}\n", state.daily_income()));
    output.push_str(&format!("- Power: {}/{}\n", state.power(), state.max_power()));
    output.push_str(&format!("- Pollution: {}\n", state.pollution()));
    output.push_str(&format!("- Stability: {:.1}%\n", state.stability()));
    output.push_str(&format!(
        "- Road networks: {}\n\n",
        state.connectivity().road_networks
    ));
}

fn render_counts(output: &mut String, state: &SimulationState) {
    let grid = state.grid();
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for (_, building) in grid.buildings() {
        *counts.entry(building.kind.as_str()).or_default() += 1;
    }
    let roads = counts.remove(ROAD).unwrap_or(0);
    let empty = grid.tiles().len() - grid.occupied_count();

    output.push_str(&format!("BUILDINGS: roads {roads}, empty tiles {empty}\n"));
    for (kind, count) in counts {
        output.push_str(&format!("- {kind}: {count}\n"));
    }
    output.push('\n');
}

fn render_occupied(output: &mut String, state: &SimulationState) {
    let occupied: Vec<_> = state.grid().buildings().collect();
    if occupied.is_empty() {
        output.push_str("OCCUPIED TILES: none, every tile is free.\n\n");
        return;
    }

    output.push_str(&format!("OCCUPIED TILES ({} total):\n", occupied.len()));
    for (coord, building) in occupied {
        output.push_str(&format!("- ({}, {}): {}", coord.x, coord.y, building.kind));
        if building.level > 1 {
            output.push_str(&format!(" level {}", building.level));
        }
        output.push('\n');
    }
    output.push('\n');
}

fn render_power(output: &mut String, state: &SimulationState) {
    let balance = state.totals().power_balance();
    output.push_str("POWER:\n");
    output.push_str(&format!("- Demand: {}\n", state.power()));
    output.push_str(&format!("- Supply: {}\n", state.max_power()));
    output.push_str(&format!("- Balance: {balance:+}\n\n"));
}

fn render_alerts(output: &mut String, state: &SimulationState) {
    let flagged = flagged_buildings(state);
    if flagged.is_empty() {
        return;
    }
    output.push_str("ALERTS:\n");
    for (coord, flags) in flagged {
        let names: Vec<String> = flags.iter().map(ToString::to_string).collect();
        output.push_str(&format!("- ({}, {}): {}\n", coord.x, coord.y, names.join(", ")));
    }
    output.push('\n');
}
