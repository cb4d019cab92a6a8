//! Proptest strategies.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of the simulation.

use proptest::prelude::*;

use civ_core::hex::Coord;
use civ_core::map_generation::MapSize;
use civ_core::settings::GameSettings;
use civ_core::terrain::Terrain;
use civ_core::unit_kind::UnitKind;

/// Generate a coordinate with both axes in `-extent..=extent`.
pub fn arb_coord(extent: i32) -> impl Strategy<Value = Coord> {
    (-extent..=extent, -extent..=extent).prop_map(|(q, r)| Coord::new(q, r))
}

/// Generate a map seed.
pub fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Generate a preset map size.
pub fn arb_map_size() -> impl Strategy<Value = MapSize> {
    prop_oneof![Just(MapSize::Small), Just(MapSize::Medium), Just(MapSize::Large)]
}

/// Generate any terrain.
pub fn arb_terrain() -> impl Strategy<Value = Terrain> {
    proptest::sample::select(Terrain::ALL.to_vec())
}

/// Generate any unit kind cities can train.
pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
    let kinds: Vec<UnitKind> = UnitKind::ALL
        .iter()
        .copied()
        .filter(|k| k.is_producible())
        .collect();
    proptest::sample::select(kinds)
}

/// Generate a combat strength in the range of the unit table.
pub fn arb_strength() -> impl Strategy<Value = u32> {
    1u32..=90
}

/// Generate valid game settings on a small map.
pub fn arb_settings() -> impl Strategy<Value = GameSettings> {
    (arb_seed(), 2u32..=5).prop_map(|(seed, players)| {
        GameSettings::default()
            .with_seed(seed)
            .with_player_count(players)
    })
}
