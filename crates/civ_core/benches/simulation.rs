//! Simulation benchmarks for civ_core.
//!
//! Run with: `cargo bench -p civ_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use civ_core::game::start_game;
use civ_core::hex::Coord;
use civ_core::map_generation::{MapConfig, MapSize};
use civ_core::pathfinding::find_path;
use civ_core::settings::GameSettings;
use civ_core::turn::end_turn;

fn map_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_generation");
    for size in [MapSize::Small, MapSize::Medium, MapSize::Large] {
        let config = MapConfig::for_size(size).with_seed(7);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{size:?}")), &config, |b, config| {
            b.iter(|| black_box(config.generate()));
        });
    }
    group.finish();
}

fn pathfinding(c: &mut Criterion) {
    let settings = GameSettings::default().with_seed(7).with_map_size(MapSize::Large);
    let Ok(state) = start_game(&settings) else {
        return;
    };
    let Some(unit) = state.units.values().next() else {
        return;
    };
    let goal = state
        .tiles
        .iter()
        .filter(|t| t.terrain.is_habitable())
        .max_by_key(|t| (unit.coord.distance(t.coord), t.coord))
        .map_or(Coord::new(0, 0), |t| t.coord);

    c.bench_function("find_path_across_map", |b| {
        b.iter(|| black_box(find_path(unit, goal, &state.tiles, &state.units)));
    });
}

fn turn_processing(c: &mut Criterion) {
    let settings = GameSettings::default()
        .with_seed(7)
        .with_player_count(5)
        .with_map_size(MapSize::Medium);
    let Ok(mut state) = start_game(&settings) else {
        return;
    };
    for _ in 0..30 {
        state = end_turn(&state);
    }

    c.bench_function("end_turn_mid_game", |b| {
        b.iter(|| black_box(end_turn(&state)));
    });
}

criterion_group!(benches, map_generation, pathfinding, turn_processing);
criterion_main!(benches);
