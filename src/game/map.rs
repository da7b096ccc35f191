//! Grid and tile types.

use serde::{Deserialize, Serialize};

use crate::config::GRID_SIZE;
use crate::error::{SimError, SimResult};

/// A coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Get adjacent coordinates (up, down, left, right).
    ///
    /// The array contains valid coordinates in indices `0..count`.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.y > 0 {
            result[usize::from(count)] = Coord::new(self.x, self.y - 1); // up
            count += 1;
        }
        if self.y + 1 < height {
            result[usize::from(count)] = Coord::new(self.x, self.y + 1); // down
            count += 1;
        }
        if self.x > 0 {
            result[usize::from(count)] = Coord::new(self.x - 1, self.y); // left
            count += 1;
        }
        if self.x + 1 < width {
            result[usize::from(count)] = Coord::new(self.x + 1, self.y); // right
            count += 1;
        }

        (result, count)
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub fn manhattan(&self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }
}

/// Ground cover of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Untouched land.
    #[default]
    Grass,
    /// Land cleared for a building.
    Ground,
}

impl Terrain {
    /// Lowercase name as stored in tile records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Ground => "ground",
        }
    }
}

/// One of the four building rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    /// Number of distinct rotations.
    pub const COUNT: u8 = 4;

    /// Create an orientation from `0..=3`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidOrientation`] for values above 3.
    pub fn new(value: u8) -> SimResult<Self> {
        if value < Self::COUNT {
            Ok(Self(value))
        } else {
            Err(SimError::InvalidOrientation(value))
        }
    }

    /// Rotation index in `0..=3`.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The next rotation clockwise.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self((self.0 + 1) % Self::COUNT)
    }
}

impl TryFrom<u8> for Orientation {
    type Error = SimError;

    fn try_from(value: u8) -> SimResult<Self> {
        Self::new(value)
    }
}

impl From<Orientation> for u8 {
    fn from(orientation: Orientation) -> Self {
        orientation.0
    }
}

/// A building standing on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Catalog key.
    pub kind: String,
    /// Current level, starting at 1.
    pub level: u8,
    /// Rotation.
    pub orientation: Orientation,
    /// Opaque custom-asset key; never interpreted by the simulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

impl Placement {
    /// A freshly built level-1 placement.
    #[must_use]
    pub fn new(kind: &str, orientation: Orientation) -> Self {
        Self {
            kind: kind.to_string(),
            level: 1,
            orientation,
            asset: None,
        }
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Ground cover.
    pub terrain: Terrain,
    /// Building on the tile, if any.
    pub building: Option<Placement>,
    /// Whether the building reaches a road. Recomputed on every refresh.
    #[serde(default)]
    pub connected: bool,
}

impl Tile {
    /// An empty grass tile.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            terrain: Terrain::Grass,
            building: None,
            connected: false,
        }
    }

    /// A cleared tile holding `placement`.
    #[must_use]
    pub const fn built(placement: Placement) -> Self {
        Self {
            terrain: Terrain::Ground,
            building: Some(placement),
            connected: false,
        }
    }

    /// Whether no building stands here.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.building.is_none()
    }

    /// Whether the tile holds a building of the given kind.
    #[must_use]
    pub fn holds(&self, kind: &str) -> bool {
        self.building.as_ref().is_some_and(|b| b.kind == kind)
    }
}

/// The city grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Width of the grid in tiles.
    width: u16,
    /// Height of the grid in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid of empty grass tiles.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            tiles: vec![Tile::empty(); size],
        })
    }

    /// The standard 17x17 grid of empty grass tiles.
    #[must_use]
    pub fn standard() -> Self {
        let size = usize::from(GRID_SIZE) * usize::from(GRID_SIZE);
        Self {
            width: GRID_SIZE,
            height: GRID_SIZE,
            tiles: vec![Tile::empty(); size],
        }
    }

    /// Get the width of the grid.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the grid.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw tiles in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert signed coordinates into a checked [`Coord`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] for negative or too-large values.
    pub fn coord(&self, x: i64, y: i64) -> SimResult<Coord> {
        let out_of_bounds = || SimError::OutOfBounds { x, y };
        let cx = u16::try_from(x).map_err(|_| out_of_bounds())?;
        let cy = u16::try_from(y).map_err(|_| out_of_bounds())?;
        let coord = Coord::new(cx, cy);
        if self.in_bounds(coord) {
            Ok(coord)
        } else {
            Err(out_of_bounds())
        }
    }

    fn index_of(&self, coord: Coord) -> SimResult<usize> {
        if self.in_bounds(coord) {
            Ok(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            Err(SimError::OutOfBounds {
                x: i64::from(coord.x),
                y: i64::from(coord.y),
            })
        }
    }

    /// Get the tile at the given coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn get(&self, coord: Coord) -> SimResult<&Tile> {
        self.index_of(coord).map(|idx| &self.tiles[idx])
    }

    /// Replace the tile at the given coordinate wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] outside the grid.
    pub fn set(&mut self, coord: Coord, tile: Tile) -> SimResult<()> {
        let idx = self.index_of(coord)?;
        self.tiles[idx] = tile;
        Ok(())
    }

    /// Iterate over all coordinates and tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        row_major(self.width, self.height).zip(self.tiles.iter())
    }

    /// Iterate over all coordinates and mutable tiles in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coord, &mut Tile)> {
        row_major(self.width, self.height).zip(self.tiles.iter_mut())
    }

    /// Iterate over tiles holding a building.
    pub fn buildings(&self) -> impl Iterator<Item = (Coord, &Placement)> {
        self.iter()
            .filter_map(|(coord, tile)| tile.building.as_ref().map(|b| (coord, b)))
    }

    /// Number of tiles holding a building.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|tile| !tile.is_empty()).count()
    }

    /// Empty tiles within `radius` of `center`, nearest first.
    ///
    /// Ties are broken by row, then column.
    #[must_use]
    pub fn find_free_near(&self, center: Coord, radius: u32) -> Vec<Coord> {
        let mut free: Vec<Coord> = self
            .iter()
            .filter(|(coord, tile)| tile.is_empty() && coord.manhattan(center) <= radius)
            .map(|(coord, _)| coord)
            .collect();
        free.sort_by_key(|coord| (coord.manhattan(center), coord.y, coord.x));
        free
    }
}

fn row_major(width: u16, height: u16) -> impl Iterator<Item = Coord> {
    (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
}
