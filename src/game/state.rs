//! Simulation state and the build / upgrade / demolish transitions.
//!
//! Every mutating operation validates first and commits second, so a rejected
//! request leaves grid and credits untouched. Aggregates are refreshed before
//! a committed operation returns.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, SimConfig};
use crate::error::{SimError, SimResult};
use crate::game::actions::IntentOutcome;
use crate::game::catalog::{BuildingCategory, Catalog, ROAD};
use crate::game::connectivity::{resolve_connectivity, ConnectivityReport};
use crate::game::economy::{aggregate_grid, Aggregates};
use crate::game::map::{Coord, Grid, Orientation, Placement, Terrain, Tile};
use crate::game::stability::{clamp_stability, next_stability, stability_change, StabilityChange};

/// Ordered record of one committed tile edit.
///
/// Renderers drain these once per tick instead of diffing the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Ground cover after the edit.
    pub terrain: Terrain,
    /// Building after the edit, `None` when the tile was cleared.
    pub building: Option<Placement>,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Day reached by the tick.
    pub day: u32,
    /// Credits earned.
    pub income: u64,
    /// Balance after income.
    pub credits: u64,
    /// Whether service coverage held.
    pub service_covered: bool,
    /// Stability before the tick.
    pub stability_before: f64,
    /// Stability after the tick.
    pub stability_after: f64,
    /// Per-signal stability contributions.
    pub change: StabilityChange,
    /// Totals the tick was computed from.
    pub totals: Aggregates,
}

/// The city: grid plus global counters.
#[derive(Debug, Clone)]
pub struct SimulationState {
    catalog: Arc<Catalog>,
    config: SimConfig,
    grid: Grid,
    credits: u64,
    day: u32,
    stability: f64,
    totals: Aggregates,
    connectivity: ConnectivityReport,
    changes: Vec<TileChange>,
}

impl Default for SimulationState {
    fn default() -> Self {
        let config = SimConfig::default();
        Self::assemble(
            Arc::new(Catalog::standard()),
            config,
            Grid::standard(),
            config.starting_credits,
            0,
            config.stability.base_stability,
        )
    }
}

impl SimulationState {
    /// A fresh city using the standard catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(config, Arc::new(Catalog::standard()))
    }

    /// A fresh city using a custom catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_catalog(config: SimConfig, catalog: Arc<Catalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.grid_width, config.grid_height)
            .ok_or_else(|| ConfigError::Invalid("grid must be non-empty".to_string()))?;
        Ok(Self::assemble(
            catalog,
            config,
            grid,
            config.starting_credits,
            0,
            config.stability.base_stability,
        ))
    }

    /// Rebuild a state from stored parts. Derived values are recomputed.
    pub(crate) fn assemble(
        catalog: Arc<Catalog>,
        config: SimConfig,
        grid: Grid,
        credits: u64,
        day: u32,
        stability: f64,
    ) -> Self {
        let mut state = Self {
            catalog,
            config,
            grid,
            credits,
            day,
            stability: clamp_stability(stability),
            totals: Aggregates::default(),
            connectivity: ConnectivityReport::default(),
            changes: Vec::new(),
        };
        state.refresh();
        state
    }

    /// The building catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Credit balance.
    #[must_use]
    pub const fn credits(&self) -> u64 {
        self.credits
    }

    /// Days elapsed.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Stability in `[0, 100]`.
    #[must_use]
    pub const fn stability(&self) -> f64 {
        self.stability
    }

    /// Derived city-wide totals.
    #[must_use]
    pub const fn totals(&self) -> &Aggregates {
        &self.totals
    }

    /// Residents.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.totals.population
    }

    /// Housing capacity.
    #[must_use]
    pub const fn max_population(&self) -> u32 {
        self.totals.max_population
    }

    /// Power demand.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.totals.power
    }

    /// Power supply.
    #[must_use]
    pub const fn max_power(&self) -> u32 {
        self.totals.max_power
    }

    /// Pollution load.
    #[must_use]
    pub const fn pollution(&self) -> i64 {
        self.totals.pollution
    }

    /// Credits earned per day.
    #[must_use]
    pub const fn daily_income(&self) -> u64 {
        self.totals.daily_income
    }

    /// Jobs offered.
    #[must_use]
    pub const fn job_capacity(&self) -> u32 {
        self.totals.job_capacity
    }

    /// Result of the latest connectivity pass.
    #[must_use]
    pub const fn connectivity(&self) -> &ConnectivityReport {
        &self.connectivity
    }

    /// Tile changes not yet drained.
    #[must_use]
    pub fn pending_changes(&self) -> &[TileChange] {
        &self.changes
    }

    /// Take all pending tile changes in commit order.
    pub fn drain_changes(&mut self) -> Vec<TileChange> {
        std::mem::take(&mut self.changes)
    }

    /// Recompute connectivity and totals from the grid.
    pub fn refresh(&mut self) {
        self.connectivity = resolve_connectivity(&mut self.grid);
        self.totals = aggregate_grid(&self.grid, &self.catalog);
    }

    /// Whether a connected governance building serves the city.
    #[must_use]
    pub fn has_service_coverage(&self) -> bool {
        self.grid.tiles().iter().any(|tile| {
            tile.connected
                && tile.building.as_ref().is_some_and(|b| {
                    self.catalog
                        .definition(&b.kind)
                        .is_ok_and(|d| d.category == BuildingCategory::Governance)
                })
        })
    }

    fn ensure_funds(&self, needed: u64) -> SimResult<()> {
        if self.credits < needed {
            return Err(SimError::InsufficientFunds {
                needed,
                available: self.credits,
            });
        }
        Ok(())
    }

    fn commit(&mut self, coord: Coord, tile: Tile) -> SimResult<()> {
        let change = TileChange {
            x: coord.x,
            y: coord.y,
            terrain: tile.terrain,
            building: tile.building.clone(),
        };
        self.grid.set(coord, tile)?;
        self.changes.push(change);
        self.refresh();
        Ok(())
    }

    fn placement_at(&self, coord: Coord) -> SimResult<Option<&Placement>> {
        Ok(self.grid.get(coord)?.building.as_ref())
    }

    /// Place a level-1 building with the default orientation.
    ///
    /// # Errors
    ///
    /// Fails with [`SimError::OutOfBounds`], [`SimError::UnknownBuildingKind`],
    /// [`SimError::TileOccupied`] or [`SimError::InsufficientFunds`], checked
    /// in that order.
    pub fn build(&mut self, coord: Coord, kind: &str) -> SimResult<IntentOutcome> {
        self.build_with_orientation(coord, kind, Orientation::default())
    }

    /// Place a level-1 building facing `orientation`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_orientation(
        &mut self,
        coord: Coord,
        kind: &str,
        orientation: Orientation,
    ) -> SimResult<IntentOutcome> {
        let tile = self.grid.get(coord)?;
        let cost = self.catalog.level_spec(kind, 1)?.cost;
        if let Some(occupant) = &tile.building {
            return Err(SimError::TileOccupied {
                x: coord.x,
                y: coord.y,
                occupant: occupant.kind.clone(),
            });
        }
        self.ensure_funds(cost)?;

        self.commit(coord, Tile::built(Placement::new(kind, orientation)))?;
        self.credits -= cost;
        debug!(x = coord.x, y = coord.y, kind, cost, "built");

        Ok(IntentOutcome::Built {
            kind: kind.to_string(),
            cost,
        })
    }

    /// Raise the building at `coord` to its next level.
    ///
    /// # Errors
    ///
    /// Fails with [`SimError::OutOfBounds`], [`SimError::NothingToUpgrade`],
    /// [`SimError::NoUpgradeAvailable`] or [`SimError::InsufficientFunds`].
    pub fn upgrade(&mut self, coord: Coord) -> SimResult<IntentOutcome> {
        let placement = self
            .placement_at(coord)?
            .ok_or(SimError::NothingToUpgrade {
                x: coord.x,
                y: coord.y,
            })?;
        let spec = self.catalog.level_spec(&placement.kind, placement.level)?;
        let (next, cost) = spec.upgrade().ok_or_else(|| SimError::NoUpgradeAvailable {
            kind: placement.kind.clone(),
            level: placement.level,
        })?;
        self.catalog.level_spec(&placement.kind, next)?;
        self.ensure_funds(cost)?;

        let mut upgraded = placement.clone();
        upgraded.level = next;
        let kind = upgraded.kind.clone();
        self.commit(coord, Tile::built(upgraded))?;
        self.credits -= cost;
        debug!(x = coord.x, y = coord.y, kind = kind.as_str(), level = next, cost, "upgraded");

        Ok(IntentOutcome::Upgraded {
            kind,
            level: next,
            cost,
        })
    }

    /// Clear the tile at `coord` and refund part of the building's cost.
    ///
    /// Roads refund a share of the configured flat road cost.
    ///
    /// # Errors
    ///
    /// Fails with [`SimError::OutOfBounds`] or [`SimError::NothingToDemolish`].
    pub fn demolish(&mut self, coord: Coord) -> SimResult<IntentOutcome> {
        let placement = self
            .placement_at(coord)?
            .ok_or(SimError::NothingToDemolish {
                x: coord.x,
                y: coord.y,
            })?;
        let cost = if placement.kind == ROAD {
            self.config.road_flat_cost
        } else {
            self.catalog
                .level_spec(&placement.kind, placement.level)
                .map_or(0, |spec| spec.cost)
        };
        let refund = self.config.refund_for(cost);
        let kind = placement.kind.clone();
        let level = placement.level;

        self.commit(coord, Tile::empty())?;
        self.credits = self.credits.saturating_add(refund);
        debug!(x = coord.x, y = coord.y, kind = kind.as_str(), refund, "demolished");

        Ok(IntentOutcome::Demolished { kind, level, refund })
    }

    /// Turn the building at `coord` to face `orientation`. Free of charge.
    ///
    /// # Errors
    ///
    /// Fails with [`SimError::OutOfBounds`] or [`SimError::NothingToEdit`].
    pub fn rotate(&mut self, coord: Coord, orientation: Orientation) -> SimResult<()> {
        self.edit_placement(coord, |placement| placement.orientation = orientation)?;
        debug!(x = coord.x, y = coord.y, orientation = orientation.value(), "rotated");
        Ok(())
    }

    /// Attach or clear a custom-asset key on the building at `coord`.
    ///
    /// # Errors
    ///
    /// Fails with [`SimError::OutOfBounds`] or [`SimError::NothingToEdit`].
    pub fn attach_asset(&mut self, coord: Coord, asset: Option<String>) -> SimResult<()> {
        let attached = asset.is_some();
        self.edit_placement(coord, move |placement| placement.asset = asset)?;
        debug!(x = coord.x, y = coord.y, attached, "asset edited");
        Ok(())
    }

    fn edit_placement(
        &mut self,
        coord: Coord,
        edit: impl FnOnce(&mut Placement),
    ) -> SimResult<()> {
        let mut placement = self
            .placement_at(coord)?
            .cloned()
            .ok_or(SimError::NothingToEdit {
                x: coord.x,
                y: coord.y,
            })?;
        edit(&mut placement);
        self.commit(coord, Tile::built(placement))
    }

    /// Advance one day.
    ///
    /// Refreshes totals, credits the daily income, applies the stability
    /// model with the given service signal and increments the day.
    pub fn advance_tick(&mut self, service_covered: bool) -> TickReport {
        self.refresh();

        let income = self.totals.daily_income;
        self.credits = self.credits.saturating_add(income);

        let stability_before = self.stability;
        let change = stability_change(&self.totals, service_covered, &self.config.stability);
        self.stability = next_stability(self.stability, &change);
        self.day = self.day.saturating_add(1);

        TickReport {
            day: self.day,
            income,
            credits: self.credits,
            service_covered,
            stability_before,
            stability_after: self.stability,
            change,
            totals: self.totals,
        }
    }

    /// Advance one day using [`has_service_coverage`](Self::has_service_coverage)
    /// as the service signal.
    pub fn tick(&mut self) -> TickReport {
        let covered = self.has_service_coverage();
        self.advance_tick(covered)
    }

    #[cfg(test)]
    pub(crate) fn totals_mut(&mut self) -> &mut Aggregates {
        &mut self.totals
    }

    #[cfg(test)]
    pub(crate) fn set_stability_raw(&mut self, stability: f64) {
        self.stability = stability;
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poor_city(credits: u64) -> SimulationState {
        SimulationState::new(SimConfig {
            starting_credits: credits,
            ..SimConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_road_then_house() {
        let mut state = SimulationState::default();
        state.build(Coord::new(8, 8), ROAD).unwrap();
        state.build(Coord::new(8, 9), "house").unwrap();

        assert_eq!(state.credits(), 650);
        assert_eq!(state.max_population(), 30);
        assert_eq!(state.population(), 30);
        assert_eq!(state.power(), 10);
        assert_eq!(state.pollution(), 2);
    }

    #[test]
    fn test_isolated_house_only_pollutes() {
        let mut state = SimulationState::default();
        state.build(Coord::new(0, 0), "house").unwrap();
        assert_eq!(state.population(), 0);
        assert_eq!(state.power(), 0);
        assert_eq!(state.daily_income(), 0);
        assert_eq!(state.pollution(), 2);
        assert_eq!(state.credits(), 700);
    }

    #[test]
    fn test_build_check_order() {
        let mut state = poor_city(10);
        assert!(matches!(
            state.build(Coord::new(17, 0), "castle"),
            Err(SimError::OutOfBounds { .. })
        ));
        assert!(matches!(
            state.build(Coord::new(0, 0), "castle"),
            Err(SimError::UnknownBuildingKind(_))
        ));
        assert_eq!(
            state.build(Coord::new(0, 0), "house").unwrap_err(),
            SimError::InsufficientFunds {
                needed: 300,
                available: 10
            }
        );
    }

    #[test]
    fn test_occupied_before_funds() {
        let mut state = poor_city(60);
        state.build(Coord::new(1, 1), ROAD).unwrap();
        let err = state.build(Coord::new(1, 1), "house").unwrap_err();
        assert_eq!(
            err,
            SimError::TileOccupied {
                x: 1,
                y: 1,
                occupant: ROAD.to_string()
            }
        );
    }

    #[test]
    fn test_failed_build_changes_nothing() {
        let mut state = poor_city(250);
        let before_grid = state.grid().clone();
        let err = state.build(Coord::new(3, 3), "house").unwrap_err();
        assert!(matches!(err, SimError::InsufficientFunds { .. }));
        assert_eq!(state.credits(), 250);
        assert_eq!(state.grid(), &before_grid);
        assert!(state.pending_changes().is_empty());
    }

    #[test]
    fn test_upgrade_chain_to_terminal() {
        let mut state = poor_city(10_000);
        let at = Coord::new(4, 4);
        state.build(at, "house").unwrap();
        assert_eq!(
            state.upgrade(at).unwrap(),
            IntentOutcome::Upgraded {
                kind: "house".to_string(),
                level: 2,
                cost: 600
            }
        );
        state.upgrade(at).unwrap();
        assert_eq!(state.credits(), 10_000 - 300 - 600 - 1200);
        assert_eq!(
            state.upgrade(at).unwrap_err(),
            SimError::NoUpgradeAvailable {
                kind: "house".to_string(),
                level: 3
            }
        );
    }

    #[test]
    fn test_upgrade_failures() {
        let mut state = poor_city(400);
        assert_eq!(
            state.upgrade(Coord::new(2, 2)).unwrap_err(),
            SimError::NothingToUpgrade { x: 2, y: 2 }
        );
        state.build(Coord::new(2, 2), ROAD).unwrap();
        assert!(matches!(
            state.upgrade(Coord::new(2, 2)),
            Err(SimError::NoUpgradeAvailable { .. })
        ));
        state.build(Coord::new(3, 3), "house").unwrap();
        assert!(matches!(
            state.upgrade(Coord::new(3, 3)),
            Err(SimError::InsufficientFunds { needed: 600, .. })
        ));
        assert_eq!(state.grid().get(Coord::new(3, 3)).unwrap().building.as_ref().unwrap().level, 1);
    }

    #[test]
    fn test_factory_upgrade_is_terminal() {
        let mut state = poor_city(5000);
        state.build(Coord::new(0, 0), "factory").unwrap();
        assert!(matches!(
            state.upgrade(Coord::new(0, 0)),
            Err(SimError::NoUpgradeAvailable { level: 1, .. })
        ));
    }

    #[test]
    fn test_demolish_refunds_quarter() {
        let mut state = SimulationState::default();
        let at = Coord::new(5, 5);
        state.build(at, "house").unwrap();
        let outcome = state.demolish(at).unwrap();
        assert_eq!(outcome.credits_delta(), 75);
        assert_eq!(state.credits(), 1000 - 300 + 75);
        let tile = state.grid().get(at).unwrap();
        assert!(tile.is_empty());
        assert_eq!(tile.terrain, Terrain::Grass);
    }

    #[test]
    fn test_demolish_road_uses_flat_cost() {
        let mut state = SimulationState::new(SimConfig {
            road_flat_cost: 80,
            ..SimConfig::default()
        })
        .unwrap();
        state.build(Coord::new(0, 0), ROAD).unwrap();
        let outcome = state.demolish(Coord::new(0, 0)).unwrap();
        assert_eq!(outcome.credits_delta(), 20);
    }

    #[test]
    fn test_demolish_empty_tile() {
        let mut state = SimulationState::default();
        assert_eq!(
            state.demolish(Coord::new(0, 0)).unwrap_err(),
            SimError::NothingToDemolish { x: 0, y: 0 }
        );
    }

    #[test]
    fn test_rotate_and_asset() {
        let mut state = SimulationState::default();
        let at = Coord::new(6, 6);
        assert_eq!(
            state.rotate(at, Orientation::new(2).unwrap()).unwrap_err(),
            SimError::NothingToEdit { x: 6, y: 6 }
        );
        state.build(at, "shop").unwrap();
        state.rotate(at, Orientation::new(2).unwrap()).unwrap();
        state.attach_asset(at, Some("custom/ferris-wheel".to_string())).unwrap();

        let placement = state.grid().get(at).unwrap().building.clone().unwrap();
        assert_eq!(placement.orientation.value(), 2);
        assert_eq!(placement.asset.as_deref(), Some("custom/ferris-wheel"));
        assert_eq!(placement.level, 1);
        assert_eq!(state.credits(), 600);
    }

    #[test]
    fn test_changes_are_ordered_and_drained() {
        let mut state = SimulationState::default();
        state.build(Coord::new(1, 0), ROAD).unwrap();
        state.build(Coord::new(1, 1), "house").unwrap();
        state.demolish(Coord::new(1, 0)).unwrap();

        let changes = state.drain_changes();
        assert_eq!(changes.len(), 3);
        assert_eq!((changes[0].x, changes[0].y), (1, 0));
        assert!(changes[1].building.as_ref().is_some_and(|b| b.kind == "house"));
        assert_eq!(changes[2].building, None);
        assert_eq!(changes[2].terrain, Terrain::Grass);
        assert!(state.drain_changes().is_empty());
    }

    #[test]
    fn test_tick_credits_income() {
        let mut state = SimulationState::default();
        state.build(Coord::new(8, 8), ROAD).unwrap();
        state.build(Coord::new(8, 9), "shop").unwrap();
        let report = state.advance_tick(false);
        assert_eq!(report.day, 1);
        assert_eq!(report.income, 24);
        assert_eq!(state.credits(), 1000 - 50 - 400 + 24);
        assert_eq!(state.day(), 1);
    }

    #[test]
    fn test_tick_stability_penalties() {
        let mut state = SimulationState::default();
        state.build(Coord::new(8, 8), ROAD).unwrap();
        state.build(Coord::new(8, 9), "house").unwrap();
        // 30 residents, no jobs, 10 power demand with no supply.
        let report = state.advance_tick(false);
        assert!((report.stability_after - (100.0 - 2.0 - 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_service_coverage_needs_connected_governance() {
        let mut state = poor_city(5000);
        state.build(Coord::new(0, 0), "police").unwrap();
        assert!(!state.has_service_coverage());
        state.build(Coord::new(1, 0), ROAD).unwrap();
        assert!(state.has_service_coverage());
    }

    #[test]
    fn test_tick_matches_explicit_coverage() {
        let mut state = poor_city(5000);
        state.build(Coord::new(0, 0), "police").unwrap();
        state.build(Coord::new(1, 0), ROAD).unwrap();
        state.build(Coord::new(2, 0), "shop").unwrap();

        let mut explicit = state.clone();
        let report = state.tick();
        assert!(report.service_covered);
        assert_eq!(report, explicit.advance_tick(true));
        assert_eq!(state.credits(), explicit.credits());
    }
}
