//! Error types for simulation operations.

use thiserror::Error;

/// A rejected simulation request.
///
/// Every variant is recoverable: the operation that produced it left the
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Coordinates fall outside the grid.
    #[error("coordinates ({x}, {y}) are outside the grid")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
    },
    /// The target tile already holds a building.
    #[error("tile ({x}, {y}) is occupied by {occupant}")]
    TileOccupied {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// Key of the building already on the tile.
        occupant: String,
    },
    /// Not enough credits for the requested operation.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Credits the operation costs.
        needed: u64,
        /// Credits currently available.
        available: u64,
    },
    /// The building is already at its final level.
    #[error("{kind} at level {level} has no further upgrade")]
    NoUpgradeAvailable {
        /// Building key.
        kind: String,
        /// Current level.
        level: u8,
    },
    /// Upgrade requested on an empty tile.
    #[error("nothing to upgrade at ({x}, {y})")]
    NothingToUpgrade {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// Demolish requested on an empty tile.
    #[error("nothing to demolish at ({x}, {y})")]
    NothingToDemolish {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// Placement edit (rotation, asset) requested on an empty tile.
    #[error("no building to edit at ({x}, {y})")]
    NothingToEdit {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// The catalog has no building with this key.
    #[error("unknown building kind '{0}'")]
    UnknownBuildingKind(String),
    /// The building kind exists but has no such level.
    #[error("{kind} has no level {level}")]
    UnknownLevel {
        /// Building key.
        kind: String,
        /// Requested level.
        level: u8,
    },
    /// Orientation outside `0..=3`.
    #[error("invalid orientation {0} (expected 0-3)")]
    InvalidOrientation(u8),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
