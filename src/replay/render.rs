//! ASCII map renderer for terminal viewing.

// Allow format! with push_str for readability - the allocation overhead is negligible for text rendering
#![allow(clippy::format_push_string)]

use crate::game::{Coord, SimulationState, Tile};

/// Symbol for a tile: one character per building kind, `.` for empty land.
#[must_use]
pub fn tile_symbol(tile: &Tile) -> char {
    let Some(building) = &tile.building else {
        return '.';
    };
    match building.kind.as_str() {
        "road" => 'R',
        "house" => 'H',
        "house2" => 'h',
        "shop" => 'S',
        "office" => 'O',
        "factory" => 'F',
        "chemistry_factory" => 'C',
        "nuke_factory" => 'N',
        "hospital" => '+',
        "police" => 'P',
        "fire_station" => 'f',
        "garbage_station" => 'G',
        "water_tower" => 'W',
        "sun_power" => 's',
        "wind_power" => 'w',
        "hero_park" => 'p',
        "park" => 'T',
        _ => '?',
    }
}

/// Render only the grid, one row per line, no borders.
#[must_use]
pub fn render_map(state: &SimulationState) -> String {
    let grid = state.grid();
    let mut output =
        String::with_capacity((usize::from(grid.width()) + 1) * usize::from(grid.height()));
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let symbol = grid.get(Coord::new(x, y)).map_or('?', tile_symbol);
            output.push(symbol);
        }
        output.push('\n');
    }
    output
}

/// Render the city with a header, bordered map, legend and stats.
///
/// Output format:
/// ```text
/// Day 12/100                 Credits: 1234
/// ┌───────────────────────────────────┐
/// │ . . . . . . . . R H . . . . . . . │
/// └───────────────────────────────────┘
///
/// Legend: R=Road H=House h=House2 ...
///
/// Population: 30/30  Power: 10/0  Pollution: 2  Stability: 95.0  Income: 0/day
/// ```
#[must_use]
pub fn render_ascii(state: &SimulationState, max_days: u32) -> String {
    let mut output = String::new();

    render_header(&mut output, state, max_days);
    render_bordered_map(&mut output, state);

    output.push_str(
        "\nLegend: R=Road H=House h=House2 S=Shop O=Office F=Factory C=Chemistry N=Nuclear\n        \
         +=Hospital P=Police f=Fire G=Garbage W=Water s=Solar w=Wind p=Hero park T=Park .=Empty\n\n",
    );

    render_stats(&mut output, state);
    output
}

fn render_header(output: &mut String, state: &SimulationState, max_days: u32) {
    let day = format!("Day {}/{max_days}", state.day());
    output.push_str(&format!("{day:<28}Credits: {}\n", state.credits()));
}

fn render_bordered_map(output: &mut String, state: &SimulationState) {
    let grid = state.grid();
    let border = "─".repeat(usize::from(grid.width()) * 2 + 1);

    output.push_str(&format!("┌{border}┐\n"));
    for y in 0..grid.height() {
        output.push_str("│ ");
        for x in 0..grid.width() {
            output.push(grid.get(Coord::new(x, y)).map_or('?', tile_symbol));
            output.push(' ');
        }
        output.push_str("│\n");
    }
    output.push_str(&format!("└{border}┘\n"));
}

fn render_stats(output: &mut String, state: &SimulationState) {
    output.push_str(&format!(
        "Population: {}/{}  Power: {}/{}  Pollution: {}  Stability: {:.1}  Income: {}/day\n",
        state.population(),
        state.max_population(),
        state.power(),
        state.max_power(),
        state.pollution(),
        state.stability(),
        state.daily_income(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Orientation, Placement, ROAD};

    #[test]
    fn test_render_ascii_basic() {
        let mut state = SimulationState::default();
        state.build(Coord::new(8, 8), ROAD).unwrap();
        state.build(Coord::new(8, 9), "house").unwrap();
        let output = render_ascii(&state, 100);

        assert!(output.contains("Day 0/100"));
        assert!(output.contains("Credits: 650"));
        assert!(output.contains('┌'));
        assert!(output.contains('┘'));
        assert!(output.contains("Legend"));
        assert!(output.contains("Population: 30/30"));
    }

    #[test]
    fn test_render_map_places_symbols() {
        let mut state = SimulationState::default();
        state.build(Coord::new(2, 0), ROAD).unwrap();
        state.build(Coord::new(0, 1), "house2").unwrap();
        let map = render_map(&state);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 17);
        assert_eq!(&lines[0][..4], "..R.");
        assert_eq!(&lines[1][..2], "h.");
    }

    #[test]
    fn test_render_map_widest_grid() {
        let state = SimulationState::new(crate::config::SimConfig {
            grid_width: crate::config::MAX_GRID_SIZE,
            grid_height: 1,
            ..crate::config::SimConfig::default()
        })
        .unwrap();
        let map = render_map(&state);
        assert_eq!(map.len(), usize::from(crate::config::MAX_GRID_SIZE) + 1);
        assert!(render_ascii(&state, 10).contains("Day 0/10"));
    }

    #[test]
    fn test_tile_symbols() {
        assert_eq!(tile_symbol(&Tile::empty()), '.');
        let tile = Tile::built(Placement::new("hospital", Orientation::default()));
        assert_eq!(tile_symbol(&tile), '+');
        let tile = Tile::built(Placement::new("castle", Orientation::default()));
        assert_eq!(tile_symbol(&tile), '?');
    }
}
