//! Test fixtures and helpers.
//!
//! Hand-built boards with known terrain, so tests can state exact
//! expectations without depending on the map generator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use civ_core::city::CityId;
use civ_core::hex::Coord;
use civ_core::map::{Tile, TileMap};
use civ_core::math::Fixed;
use civ_core::player::{Player, PlayerId, PlayerKind};
use civ_core::state::GameState;
use civ_core::terrain::Terrain;
use civ_core::unit::UnitId;
use civ_core::unit_kind::UnitKind;

/// Seat of the human in every [`TestWorld`].
pub const HUMAN: PlayerId = PlayerId(0);

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// A generator for tests that inject their own randomness.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Builder for a small hexagonal board around the origin.
///
/// Every tile starts as grassland. The human always sits in seat 0;
/// further players take the next seats in the order they are added.
#[derive(Debug, Clone)]
pub struct TestWorld {
    tiles: TileMap,
    players: Vec<Player>,
    seed: u64,
}

impl TestWorld {
    /// A grassland hexagon of `radius` with a human named "Tester".
    #[must_use]
    pub fn new(radius: u32) -> Self {
        let tiles = Coord::new(0, 0)
            .within(radius)
            .into_iter()
            .map(|c| Tile::new(c, Terrain::Grassland))
            .collect();
        Self {
            tiles,
            players: vec![Player::new(HUMAN, "Tester", PlayerKind::Human)],
            seed: 1,
        }
    }

    /// Replace the terrain of one tile.
    #[must_use]
    pub fn with_terrain(mut self, coord: Coord, terrain: Terrain) -> Self {
        self.tiles.insert(Tile::new(coord, terrain));
        self
    }

    /// Replace the terrain of several tiles.
    #[must_use]
    pub fn with_terrain_at(mut self, coords: &[Coord], terrain: Terrain) -> Self {
        for &coord in coords {
            self.tiles.insert(Tile::new(coord, terrain));
        }
        self
    }

    /// Add an AI player in the next seat.
    #[must_use]
    pub fn with_ai(mut self, name: &str) -> Self {
        let id = PlayerId(self.players.len() as u32);
        self.players.push(Player::new(id, name, PlayerKind::Ai));
        self
    }

    /// Add the barbarian player in the next seat.
    #[must_use]
    pub fn with_barbarians(mut self) -> Self {
        let id = PlayerId(self.players.len() as u32);
        self.players.push(Player::new(id, "Barbarians", PlayerKind::Barbarian));
        self
    }

    /// Give the human some gold.
    #[must_use]
    pub fn with_gold(mut self, gold: i32) -> Self {
        self.players[0].gold = fixed(gold);
        self
    }

    /// Seed the state's generator.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Finish the board.
    #[must_use]
    pub fn build(self) -> GameState {
        GameState::new(self.tiles, self.players, self.seed)
    }
}

/// Place a unit that is ready to act this turn.
///
/// # Panics
///
/// Panics if the unit cannot be found right after spawning.
pub fn place_unit(state: &mut GameState, owner: PlayerId, kind: UnitKind, coord: Coord) -> UnitId {
    let id = state.spawn_unit(owner, kind, coord);
    let unit = state.unit_mut(id).expect("unit just spawned");
    unit.moves_left = unit.max_moves;
    id
}

/// Found a city without any legality checks.
///
/// # Panics
///
/// Panics if `owner` is not seated.
pub fn place_city(state: &mut GameState, owner: PlayerId, coord: Coord) -> CityId {
    state.found_city_at(owner, coord).expect("owner is seated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_builder() {
        let state = TestWorld::new(2)
            .with_terrain(Coord::new(1, 0), Terrain::Water)
            .with_ai("Trajan")
            .with_barbarians()
            .with_gold(80)
            .build();
        assert_eq!(state.tiles.len(), 19);
        assert_eq!(state.tiles.get(Coord::new(1, 0)).unwrap().terrain, Terrain::Water);
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.barbarian_id(), Some(PlayerId(2)));
        assert_eq!(state.player(HUMAN).unwrap().gold, fixed(80));
    }

    #[test]
    fn test_placed_units_can_move() {
        let mut state = TestWorld::new(1).build();
        let id = place_unit(&mut state, HUMAN, UnitKind::Scout, Coord::new(0, 0));
        assert_eq!(state.unit(id).unwrap().moves_left, 3);
    }
}
