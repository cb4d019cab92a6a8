//! Tiles and the sparse tile map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hex::{opposite_edge, Coord};
use crate::player::PlayerId;
use crate::terrain::{Improvement, Resource, Terrain};

/// One hex of the map.
///
/// The coordinate never changes. Invariant: `is_visible` implies
/// `is_discovered`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Position.
    pub coord: Coord,
    /// Base terrain.
    pub terrain: Terrain,
    /// Hill overlay.
    pub is_hill: bool,
    /// Unclaimed tribal village.
    pub has_village: bool,
    /// Resource on the tile.
    pub resource: Option<Resource>,
    /// Built improvement.
    pub improvement: Option<Improvement>,
    /// Owning player.
    pub owner: Option<PlayerId>,
    /// In sight of the human player this turn.
    pub is_visible: bool,
    /// Seen by the human player at least once.
    pub is_discovered: bool,
    /// River edges, indexed like [`Coord::neighbors`].
    pub rivers: [bool; 6],
}

impl Tile {
    /// A bare tile of the given terrain.
    #[must_use]
    pub const fn new(coord: Coord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            is_hill: false,
            has_village: false,
            resource: None,
            improvement: None,
            owner: None,
            is_visible: false,
            is_discovered: false,
            rivers: [false; 6],
        }
    }

    /// Whether any river edge is present.
    #[must_use]
    pub fn has_river(&self) -> bool {
        self.rivers.iter().any(|&edge| edge)
    }

    /// Movement cost to enter.
    #[must_use]
    pub const fn movement_cost(&self) -> u32 {
        self.terrain.movement_cost()
    }
}

/// All tiles, addressable by coordinate.
///
/// Stored in generation order; serialized as the plain tile list and
/// re-indexed on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct TileMap {
    tiles: Vec<Tile>,
    index: HashMap<Coord, usize>,
}

impl TileMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the tile at its coordinate.
    pub fn insert(&mut self, tile: Tile) {
        if let Some(&slot) = self.index.get(&tile.coord) {
            self.tiles[slot] = tile;
        } else {
            self.index.insert(tile.coord, self.tiles.len());
            self.tiles.push(tile);
        }
    }

    /// Tile at `coord`.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index.get(&coord).map(|&slot| &self.tiles[slot])
    }

    /// Mutable tile at `coord`.
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index.get(&coord).map(|&slot| &mut self.tiles[slot])
    }

    /// Whether a tile exists at `coord`.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.index.contains_key(&coord)
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the map has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in generation order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Mutable tiles in generation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Mark the river edge between two adjacent tiles on both sides.
    ///
    /// Returns `false` if the tiles are not adjacent or either is missing.
    pub fn set_river_between(&mut self, a: Coord, b: Coord) -> bool {
        let Some(edge) = a.edge_towards(b) else {
            return false;
        };
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        if let Some(tile) = self.get_mut(a) {
            tile.rivers[edge] = true;
        }
        if let Some(tile) = self.get_mut(b) {
            tile.rivers[opposite_edge(edge)] = true;
        }
        true
    }

    /// Set the owner of every existing tile within `radius` of `center`.
    pub fn claim_radius(&mut self, center: Coord, radius: u32, owner: PlayerId) {
        for coord in center.within(radius) {
            if let Some(tile) = self.get_mut(coord) {
                tile.owner = Some(owner);
            }
        }
    }
}

impl PartialEq for TileMap {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
    }
}

impl Eq for TileMap {}

impl std::hash::Hash for TileMap {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tiles.hash(state);
    }
}

impl From<Vec<Tile>> for TileMap {
    fn from(tiles: Vec<Tile>) -> Self {
        let mut map = Self::new();
        for tile in tiles {
            map.insert(tile);
        }
        map
    }
}

impl From<TileMap> for Vec<Tile> {
    fn from(map: TileMap) -> Self {
        map.tiles
    }
}

impl FromIterator<Tile> for TileMap {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut map = Self::new();
        for tile in iter {
            map.insert(tile);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> TileMap {
        (0..3)
            .map(|q| Tile::new(Coord::new(q, 0), Terrain::Grassland))
            .collect()
    }

    #[test]
    fn test_lookup_and_replace() {
        let mut map = strip();
        assert_eq!(map.len(), 3);
        assert!(map.get(Coord::new(5, 5)).is_none());

        map.insert(Tile::new(Coord::new(1, 0), Terrain::Desert));
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(Coord::new(1, 0)).map(|t| t.terrain), Some(Terrain::Desert));
    }

    #[test]
    fn test_river_marks_both_sides() {
        let mut map = strip();
        assert!(map.set_river_between(Coord::new(0, 0), Coord::new(1, 0)));
        assert!(map.get(Coord::new(0, 0)).unwrap().rivers[2]);
        assert!(map.get(Coord::new(1, 0)).unwrap().rivers[5]);
        assert!(!map.set_river_between(Coord::new(0, 0), Coord::new(2, 0)));
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let map = strip();
        let bytes = bincode::serialize(&map).unwrap();
        let back: TileMap = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, map);
        assert!(back.get(Coord::new(2, 0)).is_some());
    }
}
