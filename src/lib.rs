// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! isocity: a deterministic tile-grid city simulation kernel.
//!
//! Players place buildings and roads on a 17x17 grid and manage credits,
//! population, power, pollution and stability. Renderers, human UIs and
//! automated agents are all clients of the same state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Script replay / text renderers    │
//! ├─────────────────────────────────────┤
//! │   Intents, snapshots, status        │
//! ├─────────────────────────────────────┤
//! │   SimulationState (grid + totals)   │
//! ├─────────────────────────────────────┤
//! │   Catalog, connectivity, stability  │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod replay;
pub mod snapshot;

pub use config::{ConfigError, SimConfig, StabilityConfig, GRID_SIZE, MAX_GRID_SIZE};
pub use error::{SimError, SimResult};

// Re-export key simulation types at crate root for convenience
pub use game::{
    apply_intent, Catalog, Coord, Grid, Intent, IntentOutcome, SimulationState, TickReport, Tile,
};
pub use snapshot::{Snapshot, SnapshotError};
