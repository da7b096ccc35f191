//! Resource aggregation.
//!
//! Global totals are recomputed from scratch by scanning every tile once:
//!
//! - population and housing capacity come from connected residential buildings
//! - power demand and supply come from connected buildings of any category
//! - pollution comes from every built tile, connected or not
//! - daily income comes from connected commercial and industrial buildings
//! - job capacity comes from connected non-residential buildings
//!
//! Each tile contributes independently, so the totals do not depend on the
//! order in which tiles are visited.

use serde::{Deserialize, Serialize};

use crate::game::catalog::Catalog;
use crate::game::map::{Grid, Tile};

/// City-wide totals derived from the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Residents. Housing is always fully occupied.
    pub population: u32,
    /// Housing capacity.
    pub max_population: u32,
    /// Power demand.
    pub power: u32,
    /// Power supply.
    pub max_power: u32,
    /// Pollution load; negative contributions clean the air.
    pub pollution: i64,
    /// Credits earned per day.
    pub daily_income: u64,
    /// Jobs offered.
    pub job_capacity: u32,
}

impl Aggregates {
    /// Whether demand exceeds supply.
    #[must_use]
    pub const fn has_power_deficit(&self) -> bool {
        self.power > self.max_power
    }

    /// Supply minus demand.
    #[must_use]
    pub fn power_balance(&self) -> i64 {
        i64::from(self.max_power) - i64::from(self.power)
    }

    /// Residents without a job.
    #[must_use]
    pub const fn unemployed(&self) -> u32 {
        self.population.saturating_sub(self.job_capacity)
    }

    fn add_tile(&mut self, tile: &Tile, catalog: &Catalog) {
        let Some(building) = &tile.building else {
            return;
        };
        let Ok(definition) = catalog.definition(&building.kind) else {
            return;
        };
        let Some(spec) = definition.level(building.level) else {
            return;
        };

        self.pollution += i64::from(spec.pollution);
        if !tile.connected {
            return;
        }

        let category = definition.category;
        if category.houses_residents() {
            self.population = self.population.saturating_add(spec.max_population);
            self.max_population = self.max_population.saturating_add(spec.max_population);
        } else {
            self.job_capacity = self.job_capacity.saturating_add(spec.jobs);
        }
        self.power = self.power.saturating_add(spec.power_usage);
        self.max_power = self.max_power.saturating_add(spec.power_output);
        if category.earns_income() {
            self.daily_income = self.daily_income.saturating_add(spec.coin_output);
        }
    }
}

/// Aggregate an arbitrary sequence of tiles.
///
/// Tiles holding kinds or levels the catalog does not know contribute nothing.
#[must_use]
pub fn aggregate_tiles<'a>(tiles: impl IntoIterator<Item = &'a Tile>, catalog: &Catalog) -> Aggregates {
    let mut totals = Aggregates::default();
    for tile in tiles {
        totals.add_tile(tile, catalog);
    }
    totals
}

/// Aggregate every tile of the grid.
///
/// Uses the `connected` flags as they stand; run connectivity first.
#[must_use]
pub fn aggregate_grid(grid: &Grid, catalog: &Catalog) -> Aggregates {
    aggregate_tiles(grid.tiles(), catalog)
}
