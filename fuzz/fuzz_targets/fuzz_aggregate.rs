#![no_main]

use arbitrary::Arbitrary;
use isocity::game::{aggregate_tiles, Orientation, Placement};
use isocity::{Catalog, Tile};
use libfuzzer_sys::fuzz_target;

const KINDS: &[&str] = &[
    "road", "house", "house2", "shop", "office", "factory", "chemistry_factory", "nuke_factory",
    "sun_power", "wind_power", "water_tower", "park", "hero_park", "hospital", "castle",
];

/// A fuzzed tile: kind index, level and road access.
#[derive(Arbitrary, Debug)]
struct TileInput {
    kind: Option<u8>,
    level: u8,
    connected: bool,
}

fuzz_target!(|input: Vec<TileInput>| {
    let catalog = Catalog::standard();
    let tiles: Vec<Tile> = input
        .iter()
        .take(1024)
        .map(|t| match t.kind {
            None => Tile::empty(),
            Some(kind) => {
                let mut placement =
                    Placement::new(KINDS[usize::from(kind) % KINDS.len()], Orientation::default());
                placement.level = t.level % 5;
                let mut tile = Tile::built(placement);
                tile.connected = t.connected;
                tile
            }
        })
        .collect();

    let forward = aggregate_tiles(&tiles, &catalog);
    let backward = aggregate_tiles(tiles.iter().rev(), &catalog);
    assert_eq!(forward, backward, "aggregation depends on tile order");

    let disconnected = tiles.iter().all(|tile| !tile.connected);
    if disconnected {
        assert_eq!(forward.power, 0);
        assert_eq!(forward.max_population, 0);
        assert_eq!(forward.daily_income, 0);
    }
});
