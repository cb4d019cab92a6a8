//! The game state aggregate.
//!
//! [`GameState`] owns every tile, unit, city and player plus the seeded
//! generator. Operations take it by reference and return a fresh copy, so
//! an observer holding the previous value never sees a partial update.
//! [`GameState::apply`] is the single entry point that mutating callers
//! are expected to use.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::actions::{apply_action, Action};
use crate::city::{City, CityId};
use crate::error::{GameError, Result};
use crate::hex::Coord;
use crate::map::TileMap;
use crate::pathfinding::has_room_for;
use crate::player::{Player, PlayerId, PlayerKind};
use crate::policy::ModifierSet;
use crate::terrain::Terrain;
use crate::unit::{Unit, UnitId};
use crate::unit_kind::{Domain, UnitKind};
use crate::visibility::{check_meeting, recompute_visibility};

/// Sender name used for engine messages.
pub const SYSTEM_SENDER: &str = "System";

/// One line in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameMessage {
    /// Turn the message was written on.
    pub turn: u32,
    /// Who wrote it.
    pub sender: String,
    /// Human-readable text.
    pub text: String,
}

/// Presentation-layer pointers threaded through the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Selected unit.
    pub unit: Option<UnitId>,
    /// Selected city.
    pub city: Option<CityId>,
    /// Selected tile.
    pub tile: Option<Coord>,
}

impl Selection {
    /// Drop every pointer.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The complete game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Turn counter, starting at 1. Only ever increases.
    pub turn: u32,
    /// The map.
    pub tiles: TileMap,
    /// Every living unit, by id.
    pub units: BTreeMap<UnitId, Unit>,
    /// Every city, by id.
    pub cities: BTreeMap<CityId, City>,
    /// Players in seat order: the human first, the barbarians last.
    pub players: Vec<Player>,
    /// UI selection.
    pub selection: Selection,
    /// Event log, oldest first.
    pub messages: Vec<GameMessage>,
    pub(crate) rng: ChaCha8Rng,
    next_unit_id: u32,
    next_city_id: u32,
}

impl GameState {
    /// A state on turn 1 with no units or cities.
    #[must_use]
    pub fn new(tiles: TileMap, players: Vec<Player>, seed: u64) -> Self {
        Self {
            turn: 1,
            tiles,
            units: BTreeMap::new(),
            cities: BTreeMap::new(),
            players,
            selection: Selection::default(),
            messages: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_unit_id: 1,
            next_city_id: 1,
        }
    }

    /// Apply one action.
    ///
    /// On success returns the new state. On failure returns the prior
    /// state with the error text appended to the log, plus the error.
    pub fn apply(self, action: Action) -> (Self, Result<()>) {
        match apply_action(&self, &action) {
            Ok(next) => (next, Ok(())),
            Err(err) => {
                tracing::debug!(?action, %err, "action rejected");
                let mut prior = self;
                prior.log(SYSTEM_SENDER, err.to_string());
                (prior, Err(err))
            }
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// The human player, if any.
    #[must_use]
    pub fn human_id(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.kind == PlayerKind::Human)
            .map(|p| p.id)
    }

    /// The barbarian player, if any.
    #[must_use]
    pub fn barbarian_id(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.is_barbarian()).map(|p| p.id)
    }

    /// Player by id.
    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// Mutable player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// Unit by id.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(GameError::UnitNotFound(id))
    }

    /// Mutable unit by id.
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(&id).ok_or(GameError::UnitNotFound(id))
    }

    /// City by id.
    pub fn city(&self, id: CityId) -> Result<&City> {
        self.cities.get(&id).ok_or(GameError::CityNotFound(id))
    }

    /// Mutable city by id.
    pub fn city_mut(&mut self, id: CityId) -> Result<&mut City> {
        self.cities.get_mut(&id).ok_or(GameError::CityNotFound(id))
    }

    /// Units standing on `coord`.
    pub fn units_at(&self, coord: Coord) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.coord == coord)
    }

    /// City on `coord`.
    #[must_use]
    pub fn city_at(&self, coord: Coord) -> Option<&City> {
        self.cities.values().find(|c| c.coord == coord)
    }

    /// Cities owned by `owner`.
    pub fn cities_of(&self, owner: PlayerId) -> impl Iterator<Item = &City> {
        self.cities.values().filter(move |c| c.owner == owner)
    }

    /// Units owned by `owner`.
    pub fn units_of(&self, owner: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == owner)
    }

    /// Whether any city lies strictly closer than `distance` to `coord`.
    #[must_use]
    pub fn city_within(&self, coord: Coord, distance: u32) -> bool {
        self.cities.values().any(|c| c.coord.distance(coord) < distance)
    }

    /// Modifier hooks for `owner`. Neutral for unknown players.
    #[must_use]
    pub fn modifiers(&self, owner: PlayerId) -> ModifierSet {
        self.player(owner)
            .map(ModifierSet::for_player)
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Mutation helpers shared by actions, AI and the turn processor
    // ------------------------------------------------------------------

    /// Append a message to the log.
    pub fn log(&mut self, sender: &str, text: impl Into<String>) {
        self.messages.push(GameMessage {
            turn: self.turn,
            sender: sender.to_string(),
            text: text.into(),
        });
    }

    /// Place a new unit. It has no moves until its owner's next turn.
    pub fn spawn_unit(&mut self, owner: PlayerId, kind: UnitKind, coord: Coord) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let mut unit = Unit::new(id, owner, kind, coord).with_moves(0);
        unit.max_moves = self.modifiers(owner).max_moves(kind);
        self.units.insert(id, unit);
        id
    }

    /// First legal tile to spawn a unit of `kind` for `owner` at a city on
    /// `center`: the center itself if its terrain fits, otherwise the first
    /// fitting non-mountain neighbor in edge order. Air units fit anywhere.
    #[must_use]
    pub fn find_spawn_spot(&self, center: Coord, owner: PlayerId, kind: UnitKind) -> Option<Coord> {
        let fits = |terrain: Terrain| match kind.domain() {
            Domain::Land => !terrain.is_water(),
            Domain::Sea => terrain.is_water(),
            Domain::Air => true,
        };

        if let Some(tile) = self.tiles.get(center) {
            if fits(tile.terrain) && has_room_for(owner, kind, center, &self.units) {
                return Some(center);
            }
        }

        center.neighbors().into_iter().find(|&n| {
            self.tiles.get(n).is_some_and(|tile| {
                fits(tile.terrain)
                    && tile.terrain != Terrain::Mountain
                    && has_room_for(owner, kind, n, &self.units)
            })
        })
    }

    /// Found a city for `owner` on `coord` and claim the ring around it.
    ///
    /// Performs no legality checks; callers validate first.
    pub fn found_city_at(&mut self, owner: PlayerId, coord: Coord) -> Result<CityId> {
        let leader = self.player(owner)?.name.clone();
        let ordinal = self.cities_of(owner).count() + 1;
        let name = format!("{leader}'s City {ordinal}");

        let id = CityId(self.next_city_id);
        self.next_city_id += 1;

        self.cities.insert(id, City::new(id, owner, name.clone(), coord));
        self.tiles.claim_radius(coord, 1, owner);

        tracing::info!(%owner, city = %id, %coord, %name, "city founded");
        self.log(SYSTEM_SENDER, format!("{name} founded"));
        Ok(id)
    }

    /// Recompute the human's fog of war and first contacts.
    pub fn refresh_visibility(&mut self) {
        let Some(human) = self.human_id() else {
            return;
        };
        recompute_visibility(&mut self.tiles, &self.units, &self.cities, human);
        let met = check_meeting(&mut self.players, &self.units, &self.cities, human);
        for opponent in met {
            let name = self
                .player(opponent)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            self.log(SYSTEM_SENDER, format!("Met {name}"));
        }
    }

    // ------------------------------------------------------------------
    // Hashing and snapshots
    // ------------------------------------------------------------------

    /// Hash of the simulation state for desync detection.
    ///
    /// Covers the turn, tiles, units, cities and players. The log, the
    /// selection and the generator position are excluded.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);
        self.tiles.hash(&mut hasher);

        self.units.len().hash(&mut hasher);
        for (id, unit) in &self.units {
            id.hash(&mut hasher);
            unit.hash(&mut hasher);
        }

        self.cities.len().hash(&mut hasher);
        for (id, city) in &self.cities {
            id.hash(&mut hasher);
            city.hash(&mut hasher);
        }

        self.players.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the whole aggregate to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game state: {e}")))
    }

    /// Restore an aggregate from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            GameError::InvalidState(format!("Failed to deserialize game state: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tile;

    fn state() -> GameState {
        let tiles: TileMap = Coord::new(0, 0)
            .within(3)
            .into_iter()
            .map(|c| Tile::new(c, Terrain::Grassland))
            .collect();
        let players = vec![
            Player::new(PlayerId(0), "Ada", PlayerKind::Human),
            Player::new(PlayerId(1), "Gilgamesh", PlayerKind::Ai),
        ];
        GameState::new(tiles, players, 42)
    }

    #[test]
    fn test_lookups_report_missing_ids() {
        let s = state();
        assert_eq!(s.human_id(), Some(PlayerId(0)));
        assert_eq!(s.barbarian_id(), None);
        assert_eq!(s.unit(UnitId(9)).unwrap_err(), GameError::UnitNotFound(UnitId(9)));
        assert_eq!(s.city(CityId(9)).unwrap_err(), GameError::CityNotFound(CityId(9)));
        assert!(s.player(PlayerId(7)).is_err());
    }

    #[test]
    fn test_spawned_units_wait_a_turn() {
        let mut s = state();
        let a = s.spawn_unit(PlayerId(0), UnitKind::Warrior, Coord::new(0, 0));
        let b = s.spawn_unit(PlayerId(0), UnitKind::Warrior, Coord::new(1, 0));
        assert_ne!(a, b);
        assert_eq!(s.unit(a).unwrap().moves_left, 0);
        assert_eq!(s.unit(a).unwrap().max_moves, 2);
    }

    #[test]
    fn test_spawn_spot_prefers_center_then_neighbors() {
        let mut s = state();
        let center = Coord::new(0, 0);
        assert_eq!(s.find_spawn_spot(center, PlayerId(0), UnitKind::Warrior), Some(center));

        s.spawn_unit(PlayerId(0), UnitKind::Warrior, center);
        assert_eq!(
            s.find_spawn_spot(center, PlayerId(0), UnitKind::Warrior),
            Some(center.neighbors()[0])
        );
        assert_eq!(s.find_spawn_spot(center, PlayerId(0), UnitKind::Settler), Some(center));
        assert_eq!(s.find_spawn_spot(center, PlayerId(0), UnitKind::Galley), None);
    }

    #[test]
    fn test_air_units_spawn_inland() {
        let mut s = state();
        let center = Coord::new(0, 0);
        assert_eq!(s.find_spawn_spot(center, PlayerId(0), UnitKind::Fighter), Some(center));

        s.spawn_unit(PlayerId(0), UnitKind::Warrior, center);
        s.spawn_unit(PlayerId(0), UnitKind::Fighter, center);
        assert_eq!(
            s.find_spawn_spot(center, PlayerId(0), UnitKind::Bomber),
            Some(center.neighbors()[0])
        );
    }

    #[test]
    fn test_found_city_names_and_claims() {
        let mut s = state();
        let id = s.found_city_at(PlayerId(1), Coord::new(0, 0)).unwrap();
        let city = s.city(id).unwrap();
        assert_eq!(city.name, "Gilgamesh's City 1");
        for n in Coord::new(0, 0).neighbors() {
            assert_eq!(s.tiles.get(n).unwrap().owner, Some(PlayerId(1)));
        }
        assert_eq!(s.tiles.get(Coord::new(2, 0)).unwrap().owner, None);
        assert!(s.city_within(Coord::new(2, 0), 3));
        assert!(!s.city_within(Coord::new(3, 0), 3));
    }

    #[test]
    fn test_hash_tracks_simulation_not_log() {
        let mut s = state();
        let before = s.state_hash();
        s.log(SYSTEM_SENDER, "hello");
        s.selection.tile = Some(Coord::new(1, 1));
        assert_eq!(s.state_hash(), before);
        s.spawn_unit(PlayerId(0), UnitKind::Scout, Coord::new(0, 0));
        assert_ne!(s.state_hash(), before);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut s = state();
        s.spawn_unit(PlayerId(0), UnitKind::Builder, Coord::new(0, 0));
        s.found_city_at(PlayerId(0), Coord::new(1, 0)).unwrap();
        let bytes = s.serialize().unwrap();
        let back = GameState::deserialize(&bytes).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.state_hash(), s.state_hash());
        assert!(GameState::deserialize(&[1, 2, 3]).is_err());
    }
}
