//! Benchmarks for the per-tick hot path.
//!
//! Every intent and every tick re-resolves connectivity and re-aggregates the
//! whole grid, so those two scans dominate.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use isocity::game::{aggregate_grid, label_road_networks, resolve_connectivity, ROAD};
use isocity::{Coord, SimConfig, SimulationState};

/// A city with a road on every third column and buildings between them.
fn dense_city() -> SimulationState {
    let mut state = SimulationState::new(SimConfig {
        starting_credits: 10_000_000,
        ..SimConfig::default()
    })
    .unwrap();
    let kinds = ["house", "shop", "house2", "factory", "sun_power", "office"];
    let size = state.grid().width();
    for y in 0..size {
        for x in 0..size {
            let kind = if x % 3 == 0 {
                ROAD
            } else {
                kinds[usize::from(x + y) % kinds.len()]
            };
            state.build(Coord::new(x, y), kind).unwrap();
        }
    }
    state
}

fn bench_tick(c: &mut Criterion) {
    let state = dense_city();

    c.bench_function("tick_dense_17x17", |b| {
        b.iter_batched(
            || state.clone(),
            |mut state| black_box(state.tick()),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let state = dense_city();

    c.bench_function("aggregate_dense_17x17", |b| {
        b.iter(|| black_box(aggregate_grid(black_box(state.grid()), state.catalog())));
    });
}

fn bench_connectivity(c: &mut Criterion) {
    let state = dense_city();

    c.bench_function("resolve_connectivity_dense_17x17", |b| {
        b.iter_batched(
            || state.grid().clone(),
            |mut grid| black_box(resolve_connectivity(&mut grid)),
            criterion::BatchSize::SmallInput,
        );
    });

    c.bench_function("label_road_networks_dense_17x17", |b| {
        b.iter(|| black_box(label_road_networks(black_box(state.grid()))));
    });
}

fn bench_build_demolish(c: &mut Criterion) {
    let state = SimulationState::default();

    c.bench_function("build_then_demolish", |b| {
        b.iter_batched(
            || state.clone(),
            |mut state| {
                state.build(Coord::new(8, 8), ROAD).unwrap();
                state.build(Coord::new(8, 9), "house").unwrap();
                black_box(state.demolish(Coord::new(8, 9)).unwrap())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_aggregate,
    bench_connectivity,
    bench_build_demolish
);
criterion_main!(benches);
