//! Snapshots: the persisted and transported form of a city.
//!
//! A snapshot is the grid of tile records, indexed `[x][y]`, plus the global
//! counters. Records use the wire shape clients already speak:
//!
//! ```json
//! { "type": "ground", "building": "house", "level": 2, "direction": 1 }
//! ```
//!
//! Restoring validates every record and recomputes all derived totals, so the
//! stored counters are informational only.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SimConfig};
use crate::error::SimError;
use crate::game::{Catalog, Coord, Grid, Orientation, Placement, SimulationState, Terrain, Tile};

/// Error saving, loading or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be read or written.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not a valid snapshot.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The grid is empty or ragged.
    #[error("bad grid shape: {0}")]
    Shape(String),
    /// A tile record names an unknown kind, level or direction.
    #[error("invalid tile at ({x}, {y}): {source}")]
    InvalidTile {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// What was wrong with the record.
        source: SimError,
    },
    /// The configuration to restore with is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Stability is not a finite number.
    #[error("stability must be finite, got {0}")]
    InvalidStability(f64),
}

const fn default_level() -> u8 {
    1
}

/// One tile in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Ground cover.
    #[serde(rename = "type")]
    pub terrain: Terrain,
    /// Building key, `null` for empty tiles.
    pub building: Option<String>,
    /// Building level; 1 on empty tiles.
    #[serde(default = "default_level")]
    pub level: u8,
    /// Rotation in `0..=3`.
    #[serde(default)]
    pub direction: u8,
    /// Custom-asset key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

impl From<&Tile> for TileRecord {
    fn from(tile: &Tile) -> Self {
        match &tile.building {
            Some(b) => Self {
                terrain: tile.terrain,
                building: Some(b.kind.clone()),
                level: b.level,
                direction: b.orientation.value(),
                asset: b.asset.clone(),
            },
            None => Self {
                terrain: tile.terrain,
                building: None,
                level: 1,
                direction: 0,
                asset: None,
            },
        }
    }
}

impl TileRecord {
    fn to_tile(&self, catalog: &Catalog) -> Result<Tile, SimError> {
        let orientation = Orientation::new(self.direction)?;
        let Some(kind) = &self.building else {
            return Ok(Tile {
                terrain: self.terrain,
                ..Tile::empty()
            });
        };
        catalog.level_spec(kind, self.level)?;
        Ok(Tile {
            terrain: self.terrain,
            building: Some(Placement {
                kind: kind.clone(),
                level: self.level,
                orientation,
                asset: self.asset.clone(),
            }),
            connected: false,
        })
    }
}

/// A full city snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Tile records indexed `[x][y]`.
    pub grid: Vec<Vec<TileRecord>>,
    /// Credit balance.
    pub credits: u64,
    /// Days elapsed.
    pub day: u32,
    /// Residents.
    pub population: u32,
    /// Housing capacity.
    pub max_population: u32,
    /// Power demand.
    pub power: u32,
    /// Power supply.
    pub max_power: u32,
    /// Pollution load.
    pub pollution: i64,
    /// Stability.
    pub stability: f64,
    /// Credits earned per day.
    pub daily_income: u64,
    /// Jobs offered.
    #[serde(default)]
    pub job_capacity: u32,
}

impl Snapshot {
    /// Capture the current state.
    #[must_use]
    pub fn capture(state: &SimulationState) -> Self {
        let grid = state.grid();
        let columns = (0..grid.width())
            .map(|x| {
                (0..grid.height())
                    .filter_map(|y| grid.get(Coord::new(x, y)).ok())
                    .map(TileRecord::from)
                    .collect()
            })
            .collect();
        let totals = state.totals();

        Self {
            grid: columns,
            credits: state.credits(),
            day: state.day(),
            population: totals.population,
            max_population: totals.max_population,
            power: totals.power,
            max_power: totals.max_power,
            pollution: totals.pollution,
            stability: state.stability(),
            daily_income: totals.daily_income,
            job_capacity: totals.job_capacity,
        }
    }

    /// Grid width (number of columns).
    #[must_use]
    pub fn width(&self) -> usize {
        self.grid.len()
    }

    /// Grid height (length of the first column).
    #[must_use]
    pub fn height(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Rebuild a state from this snapshot.
    ///
    /// Grid dimensions come from the snapshot and override `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the grid is empty,
    /// oversized or ragged, a record is invalid, or stability is not finite.
    pub fn restore(
        &self,
        config: SimConfig,
        catalog: Arc<Catalog>,
    ) -> Result<SimulationState, SnapshotError> {
        let width = u16::try_from(self.width())
            .map_err(|_| SnapshotError::Shape(format!("{} columns is too wide", self.width())))?;
        let height = u16::try_from(self.height())
            .map_err(|_| SnapshotError::Shape(format!("{} rows is too tall", self.height())))?;
        if width == 0 || height == 0 {
            return Err(SnapshotError::Shape(format!(
                "grid must be non-empty, got {width}x{height}"
            )));
        }
        let config = SimConfig {
            grid_width: width,
            grid_height: height,
            ..config
        };
        config.validate()?;

        let mut grid = Grid::new(width, height).ok_or_else(|| {
            SnapshotError::Shape(format!("grid must be non-empty, got {width}x{height}"))
        })?;

        for (x, column) in (0..width).zip(&self.grid) {
            if column.len() != usize::from(height) {
                return Err(SnapshotError::Shape(format!(
                    "column {x} has {} rows, expected {height}",
                    column.len()
                )));
            }
            for (y, record) in (0..height).zip(column) {
                let invalid = |source| SnapshotError::InvalidTile { x, y, source };
                let tile = record.to_tile(&catalog).map_err(invalid)?;
                grid.set(Coord::new(x, y), tile).map_err(invalid)?;
            }
        }

        if !self.stability.is_finite() {
            return Err(SnapshotError::InvalidStability(self.stability));
        }

        Ok(SimulationState::assemble(
            catalog,
            config,
            grid,
            self.credits,
            self.day,
            self.stability,
        ))
    }

    /// Restore with the default configuration and standard catalog.
    ///
    /// # Errors
    ///
    /// See [`restore`](Self::restore).
    pub fn restore_standard(&self) -> Result<SimulationState, SnapshotError> {
        self.restore(SimConfig::default(), Arc::new(Catalog::standard()))
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a snapshot.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write to a file as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the file is not a snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
