//! Property-based tests for the simulation kernel.
//!
//! These tests verify aggregation, stability and transition properties over
//! random tiles and random intent sequences.
//! Run with: cargo test --release prop_sim

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use isocity::game::{
    aggregate_tiles, check_invariants, clamp_stability, next_stability, Orientation, Placement,
    StabilityChange,
};
use isocity::{apply_intent, Catalog, Intent, SimConfig, SimulationState, Tile};

const KINDS: &[&str] = &[
    "road",
    "house",
    "house2",
    "shop",
    "office",
    "factory",
    "sun_power",
    "wind_power",
    "park",
    "hospital",
    "castle",
];

fn tile_strategy() -> impl Strategy<Value = Tile> {
    prop_oneof![
        1 => Just(Tile::empty()),
        4 => (0..KINDS.len(), 1u8..=3, any::<bool>()).prop_map(|(index, level, connected)| {
            let mut placement = Placement::new(KINDS[index], Orientation::default());
            placement.level = level;
            let mut tile = Tile::built(placement);
            tile.connected = connected;
            tile
        }),
    ]
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    let coord = -2i64..19;
    prop_oneof![
        4 => (0..KINDS.len(), coord.clone(), coord.clone())
            .prop_map(|(index, x, y)| Intent::build(KINDS[index], x, y)),
        2 => (coord.clone(), coord.clone()).prop_map(|(x, y)| Intent::Upgrade { x, y }),
        2 => (coord.clone(), coord).prop_map(|(x, y)| Intent::Demolish { x, y }),
        1 => Just(Intent::Wait),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Totals do not depend on the order tiles are visited in.
    #[test]
    fn prop_aggregation_order_independent(
        (tiles, shuffled) in proptest::collection::vec(tile_strategy(), 0..80)
            .prop_flat_map(|tiles| (Just(tiles.clone()), Just(tiles).prop_shuffle()))
    ) {
        let catalog = Catalog::standard();
        prop_assert_eq!(aggregate_tiles(&tiles, &catalog), aggregate_tiles(&shuffled, &catalog));
    }

    /// Disconnected tiles only ever contribute pollution.
    #[test]
    fn prop_disconnected_tiles_only_pollute(
        tiles in proptest::collection::vec(tile_strategy(), 0..80)
    ) {
        let catalog = Catalog::standard();
        let disconnected: Vec<Tile> = tiles
            .into_iter()
            .map(|mut tile| {
                tile.connected = false;
                tile
            })
            .collect();
        let totals = aggregate_tiles(&disconnected, &catalog);
        prop_assert_eq!(totals.population, 0);
        prop_assert_eq!(totals.max_population, 0);
        prop_assert_eq!(totals.power, 0);
        prop_assert_eq!(totals.max_power, 0);
        prop_assert_eq!(totals.daily_income, 0);
        prop_assert_eq!(totals.job_capacity, 0);
    }

    /// Clamping always lands inside the stability range.
    #[test]
    fn prop_clamp_in_range(value in any::<f64>()) {
        let clamped = clamp_stability(value);
        prop_assert!((0.0..=100.0).contains(&clamped));
    }

    /// A stability step from any in-range value stays in range.
    #[test]
    fn prop_next_stability_in_range(
        current in 0.0f64..=100.0,
        service in 0.0f64..50.0,
        unemployment in -50.0f64..=0.0,
        pollution in -50.0f64..=0.0,
        power in -50.0f64..=0.0,
    ) {
        let change = StabilityChange { service, unemployment, pollution, power };
        let next = next_stability(current, &change);
        prop_assert!((0.0..=100.0).contains(&next));
    }

    /// Random intent sequences never break the state invariants, and every
    /// rejected intent leaves the city exactly as it was.
    #[test]
    fn prop_intents_keep_invariants(
        intents in proptest::collection::vec(intent_strategy(), 1..60),
        credits in 0u64..20_000,
    ) {
        let mut state = SimulationState::new(SimConfig {
            starting_credits: credits,
            ..SimConfig::default()
        })
        .unwrap();

        for intent in &intents {
            let before = state.clone();
            match apply_intent(&mut state, intent) {
                Ok(outcome) => {
                    let delta = i128::from(state.credits()) - i128::from(before.credits());
                    prop_assert_eq!(delta, i128::from(outcome.credits_delta()));
                }
                Err(_) => {
                    prop_assert_eq!(state.credits(), before.credits());
                    prop_assert_eq!(state.grid(), before.grid());
                    prop_assert_eq!(state.totals(), before.totals());
                }
            }
            let violations = check_invariants(&state);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Ticking never breaks the invariants either.
    #[test]
    fn prop_ticks_keep_invariants(
        intents in proptest::collection::vec(intent_strategy(), 1..30),
        ticks in 1usize..20,
    ) {
        let mut state = SimulationState::new(SimConfig {
            starting_credits: 10_000,
            ..SimConfig::default()
        })
        .unwrap();
        for intent in &intents {
            let _ = apply_intent(&mut state, intent);
        }
        for _ in 0..ticks {
            let credits = state.credits();
            let report = state.tick();
            prop_assert_eq!(state.credits(), credits + report.income);
            prop_assert!((0.0..=100.0).contains(&state.stability()));
        }
        prop_assert!(check_invariants(&state).is_empty());
    }
}
