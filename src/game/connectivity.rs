//! Road connectivity.
//!
//! A building is connected when one of its four neighbours is a road. Roads
//! themselves count as connected. Road tiles are additionally grouped into
//! networks by flood fill so callers can tell apart separate road systems.

use std::collections::VecDeque;

use crate::game::catalog::ROAD;
use crate::game::map::{Coord, Grid};

/// Summary of one connectivity pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// Road tiles on the grid.
    pub road_tiles: u32,
    /// Non-road buildings touching a road.
    pub connected_buildings: u32,
    /// Non-road buildings with no adjacent road.
    pub disconnected_buildings: u32,
    /// Separate road networks.
    pub road_networks: u32,
}

/// Road network label for every tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadNetworks {
    width: u16,
    labels: Vec<Option<u32>>,
    count: u32,
}

impl RoadNetworks {
    /// Network id of the road at `coord`, `None` for non-road tiles.
    #[must_use]
    pub fn network_of(&self, coord: Coord) -> Option<u32> {
        let idx = usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x);
        self.labels.get(idx).copied().flatten()
    }

    /// Number of separate networks.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

fn is_road(grid: &Grid, coord: Coord) -> bool {
    grid.get(coord).is_ok_and(|tile| tile.holds(ROAD))
}

/// Whether the tile at `coord` is a road or touches one.
#[must_use]
pub fn touches_road(grid: &Grid, coord: Coord) -> bool {
    if is_road(grid, coord) {
        return true;
    }
    let (adj, count) = coord.adjacent(grid.width(), grid.height());
    adj[..usize::from(count)]
        .iter()
        .any(|&neighbor| is_road(grid, neighbor))
}

/// Label road tiles by connected component (4-neighbourhood).
#[must_use]
pub fn label_road_networks(grid: &Grid) -> RoadNetworks {
    let width = grid.width();
    let index = |coord: Coord| usize::from(coord.y) * usize::from(width) + usize::from(coord.x);

    let mut labels = vec![None; grid.tiles().len()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for (start, tile) in grid.iter() {
        if !tile.holds(ROAD) || labels[index(start)].is_some() {
            continue;
        }

        labels[index(start)] = Some(count);
        queue.push_back(start);
        while let Some(coord) = queue.pop_front() {
            let (adj, n) = coord.adjacent(width, grid.height());
            for &neighbor in &adj[..usize::from(n)] {
                if labels[index(neighbor)].is_none() && is_road(grid, neighbor) {
                    labels[index(neighbor)] = Some(count);
                    queue.push_back(neighbor);
                }
            }
        }
        count += 1;
    }

    RoadNetworks {
        width,
        labels,
        count,
    }
}

/// Recompute the `connected` flag of every tile from scratch.
pub fn resolve_connectivity(grid: &mut Grid) -> ConnectivityReport {
    let flags: Vec<bool> = grid
        .iter()
        .map(|(coord, tile)| !tile.is_empty() && touches_road(grid, coord))
        .collect();

    let mut report = ConnectivityReport {
        road_networks: label_road_networks(grid).count(),
        ..ConnectivityReport::default()
    };

    for ((_, tile), connected) in grid.iter_mut().zip(flags) {
        tile.connected = connected;
        match &tile.building {
            None => {}
            Some(building) if building.kind == ROAD => report.road_tiles += 1,
            Some(_) if connected => report.connected_buildings += 1,
            Some(_) => report.disconnected_buildings += 1,
        }
    }

    report
}
