//! Property-based tests for geometry, map generation and fog of war.

use proptest::prelude::*;

use civ_core::combat::resolve_combat;
use civ_core::hex::{distance, opposite_edge, Coord};
use civ_core::map_generation::{generate_map, MapConfig};
use civ_core::player::PlayerId;
use civ_core::turn::advance_turn;
use civ_core::unit::{Unit, UnitId};
use civ_test_utils::determinism::new_game;
use civ_test_utils::fixtures::seeded_rng;
use civ_test_utils::strategies::{arb_coord, arb_map_size, arb_seed, arb_settings, arb_strength, arb_unit_kind};

proptest! {
    #[test]
    fn prop_distance_is_a_metric(
        a in arb_coord(50),
        b in arb_coord(50),
        c in arb_coord(50),
    ) {
        prop_assert_eq!(distance(a, a), 0);
        prop_assert_eq!(distance(a, b), distance(b, a));
        prop_assert!(distance(a, c) <= distance(a, b) + distance(b, c));
        prop_assert_eq!(distance(a, b) == 0, a == b);
    }

    #[test]
    fn prop_neighbors_are_adjacent(c in arb_coord(100)) {
        for (edge, n) in c.neighbors().into_iter().enumerate() {
            prop_assert_eq!(distance(c, n), 1);
            prop_assert_eq!(n.edge_towards(c), Some(opposite_edge(edge)));
        }
    }

    #[test]
    fn prop_combat_is_pure(
        attacker_kind in arb_unit_kind(),
        defender_kind in arb_unit_kind(),
        attacker_strength in arb_strength(),
        defender_strength in arb_strength(),
        gap in 1i32..=3,
    ) {
        let attacker = Unit::new(UnitId(1), PlayerId(0), attacker_kind, Coord::new(0, 0))
            .with_strength(attacker_strength);
        let defender = Unit::new(UnitId(2), PlayerId(1), defender_kind, Coord::new(gap, 0))
            .with_strength(defender_strength);

        let first = resolve_combat(&attacker, &defender, 0);
        let second = resolve_combat(&attacker, &defender, 0);
        prop_assert_eq!(first, second);
        prop_assert!(first.attacker_damage >= 0);
        prop_assert!(first.defender_damage >= 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_river_edges_are_symmetric(seed in arb_seed(), size in arb_map_size()) {
        let map = MapConfig::for_size(size).with_seed(seed).generate();
        for tile in map.iter() {
            for (edge, neighbor) in tile.coord.neighbors().into_iter().enumerate() {
                if tile.rivers[edge] {
                    let other = map.get(neighbor);
                    prop_assert!(other.is_some_and(|t| t.rivers[opposite_edge(edge)]));
                }
            }
        }
    }

    #[test]
    fn prop_generation_is_seeded(seed in arb_seed()) {
        let mut a = seeded_rng(seed);
        let mut b = seeded_rng(seed);
        prop_assert_eq!(generate_map(20, 18, &mut a), generate_map(20, 18, &mut b));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_visible_implies_discovered_and_discovery_sticks(settings in arb_settings()) {
        let mut state = new_game(&settings);
        let mut discovered: Vec<_> = state
            .tiles
            .iter()
            .filter(|t| t.is_discovered)
            .map(|t| t.coord)
            .collect();

        for _ in 0..15 {
            advance_turn(&mut state);
            for tile in state.tiles.iter() {
                prop_assert!(!tile.is_visible || tile.is_discovered);
            }
            for &coord in &discovered {
                prop_assert!(state.tiles.get(coord).is_some_and(|t| t.is_discovered));
            }
            discovered = state
                .tiles
                .iter()
                .filter(|t| t.is_discovered)
                .map(|t| t.coord)
                .collect();
        }
    }

    #[test]
    fn prop_turns_only_move_forward(settings in arb_settings()) {
        let mut state = new_game(&settings);
        for expected in 2..=10 {
            advance_turn(&mut state);
            prop_assert_eq!(state.turn, expected);
        }
    }
}
