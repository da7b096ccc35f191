//! Simulation layer for isocity.
//!
//! Implements the city rules on a fixed tile grid:
//! - Building catalog with per-level economics
//! - Grid with tiles, terrain and placements
//! - Road connectivity
//! - Resource aggregation and the stability model
//! - Build / upgrade / demolish transitions and agent intents

mod actions;
mod catalog;
mod connectivity;
mod economy;
mod invariants;
mod map;
mod stability;
mod state;
mod status;

pub use actions::{apply_intent, Intent, IntentOutcome};
pub use catalog::{
    BuildingCategory, BuildingDefinition, Catalog, CatalogError, LevelSpec, MAX_LEVELS, ROAD,
};
pub use connectivity::{
    label_road_networks, resolve_connectivity, touches_road, ConnectivityReport, RoadNetworks,
};
pub use economy::{aggregate_grid, aggregate_tiles, Aggregates};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use map::{Coord, Grid, Orientation, Placement, Terrain, Tile};
pub use stability::{
    clamp_stability, next_stability, stability_change, StabilityChange, MAX_STABILITY,
    MIN_STABILITY,
};
pub use state::{SimulationState, TickReport, TileChange};
pub use status::{building_status, flagged_buildings, StatusFlag};
