#![no_main]

use arbitrary::Arbitrary;
use isocity::game::check_invariants;
use isocity::{apply_intent, Intent, SimConfig, SimulationState};
use libfuzzer_sys::fuzz_target;

const KINDS: &[&str] = &[
    "road", "house", "house2", "shop", "office", "factory", "nuke_factory", "sun_power",
    "hospital", "park", "unknown",
];

/// One fuzzed agent action.
#[derive(Arbitrary, Debug)]
enum Action {
    Build { kind: u8, x: i8, y: i8 },
    Upgrade { x: i8, y: i8 },
    Demolish { x: i8, y: i8 },
    Wait,
    Tick { service: bool },
}

/// Structured input for intent fuzzing.
#[derive(Arbitrary, Debug)]
struct IntentInput {
    /// Starting balance (capped).
    credits: u32,
    /// Actions applied in order (capped).
    actions: Vec<Action>,
}

fuzz_target!(|input: IntentInput| {
    let config = SimConfig {
        starting_credits: u64::from(input.credits.min(1_000_000)),
        ..SimConfig::default()
    };
    let Ok(mut state) = SimulationState::new(config) else {
        return;
    };

    for action in input.actions.iter().take(256) {
        let intent = match *action {
            Action::Build { kind, x, y } => {
                Intent::build(KINDS[usize::from(kind) % KINDS.len()], x.into(), y.into())
            }
            Action::Upgrade { x, y } => Intent::Upgrade { x: x.into(), y: y.into() },
            Action::Demolish { x, y } => Intent::Demolish { x: x.into(), y: y.into() },
            Action::Wait => Intent::Wait,
            Action::Tick { service } => {
                let credits = state.credits();
                let report = state.advance_tick(service);
                assert_eq!(state.credits(), credits + report.income);
                assert!((0.0..=100.0).contains(&state.stability()));
                continue;
            }
        };

        let credits = state.credits();
        let grid = state.grid().clone();
        if apply_intent(&mut state, &intent).is_err() {
            assert_eq!(state.credits(), credits, "rejected intent changed credits");
            assert_eq!(state.grid(), &grid, "rejected intent changed the grid");
        }

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
    }
});
