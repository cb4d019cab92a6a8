//! Fog of war and first contact.
//!
//! Tile visibility flags describe the human player's view. Each call
//! rebuilds visibility from the current positions of that player's units
//! and cities; discovery is sticky.

use std::collections::BTreeMap;

use crate::city::{City, CityId};
use crate::hex::Coord;
use crate::map::TileMap;
use crate::player::{Player, PlayerId};
use crate::unit::{Unit, UnitId};

/// Sight radius of a city.
pub const CITY_SIGHT: u32 = 2;

/// Distance at or within which two players' assets make contact.
pub const MEETING_DISTANCE: u32 = 4;

/// Positions and sight radii of everything `player` owns.
fn sight_sources(
    units: &BTreeMap<UnitId, Unit>,
    cities: &BTreeMap<CityId, City>,
    player: PlayerId,
) -> Vec<(Coord, u32)> {
    let units = units
        .values()
        .filter(|u| u.owner == player)
        .map(|u| (u.coord, u.kind.sight_radius()));
    let cities = cities
        .values()
        .filter(|c| c.owner == player)
        .map(|c| (c.coord, CITY_SIGHT));
    units.chain(cities).collect()
}

/// Recompute visibility for `player` from scratch.
///
/// Every tile loses `is_visible`, then every tile within sight of one of
/// the player's units or cities becomes visible and discovered.
pub fn recompute_visibility(
    tiles: &mut TileMap,
    units: &BTreeMap<UnitId, Unit>,
    cities: &BTreeMap<CityId, City>,
    player: PlayerId,
) {
    for tile in tiles.iter_mut() {
        tile.is_visible = false;
    }

    for (center, radius) in sight_sources(units, cities, player) {
        for coord in center.within(radius) {
            if let Some(tile) = tiles.get_mut(coord) {
                tile.is_visible = true;
                tile.is_discovered = true;
            }
        }
    }
}

/// Record first contact between `human` and every opponent with an asset
/// within [`MEETING_DISTANCE`] of one of the human's assets.
///
/// Symmetric and monotonic. Returns the newly met opponents.
pub fn check_meeting(
    players: &mut [Player],
    units: &BTreeMap<UnitId, Unit>,
    cities: &BTreeMap<CityId, City>,
    human: PlayerId,
) -> Vec<PlayerId> {
    let Some(already_met) = players
        .iter()
        .find(|p| p.id == human)
        .map(|p| p.met_players.clone())
    else {
        return Vec::new();
    };

    let mine = sight_sources(units, cities, human);
    let mut newly_met = Vec::new();

    for opponent in players.iter().map(|p| p.id) {
        if opponent == human || already_met.contains(&opponent) {
            continue;
        }
        let theirs = sight_sources(units, cities, opponent);
        let met = mine.iter().any(|(a, _)| {
            theirs
                .iter()
                .any(|(b, _)| a.distance(*b) <= MEETING_DISTANCE)
        });
        if met {
            newly_met.push(opponent);
        }
    }

    for player in players.iter_mut() {
        if player.id == human {
            player.met_players.extend(newly_met.iter().copied());
        } else if newly_met.contains(&player.id) {
            player.met_players.insert(human);
        }
    }

    for opponent in &newly_met {
        tracing::info!(%human, %opponent, "first contact");
    }

    newly_met
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tile;
    use crate::player::PlayerKind;
    use crate::terrain::Terrain;
    use crate::unit_kind::UnitKind;

    fn board(radius: u32) -> TileMap {
        Coord::new(0, 0)
            .within(radius)
            .into_iter()
            .map(|c| Tile::new(c, Terrain::Grassland))
            .collect()
    }

    fn units(list: &[(u32, PlayerId, UnitKind, Coord)]) -> BTreeMap<UnitId, Unit> {
        list.iter()
            .map(|&(id, owner, kind, coord)| (UnitId(id), Unit::new(UnitId(id), owner, kind, coord)))
            .collect()
    }

    #[test]
    fn test_sight_radius() {
        let mut tiles = board(6);
        let human = PlayerId(0);
        let us = units(&[
            (1, human, UnitKind::Warrior, Coord::new(0, 0)),
            (2, human, UnitKind::Scout, Coord::new(-4, 0)),
        ]);
        recompute_visibility(&mut tiles, &us, &BTreeMap::new(), human);

        assert!(tiles.get(Coord::new(2, 0)).unwrap().is_visible);
        assert!(!tiles.get(Coord::new(3, 0)).unwrap().is_visible);
        assert!(tiles.get(Coord::new(-4, 3)).unwrap().is_visible);
        assert!(!tiles.get(Coord::new(5, 0)).unwrap().is_discovered);
    }

    #[test]
    fn test_visibility_recomputed_but_discovery_sticks() {
        let mut tiles = board(6);
        let human = PlayerId(0);
        let mut us = units(&[(1, human, UnitKind::Warrior, Coord::new(0, 0))]);
        recompute_visibility(&mut tiles, &us, &BTreeMap::new(), human);

        us.get_mut(&UnitId(1)).unwrap().coord = Coord::new(4, 0);
        recompute_visibility(&mut tiles, &us, &BTreeMap::new(), human);

        let origin = tiles.get(Coord::new(-2, 0)).unwrap();
        assert!(!origin.is_visible);
        assert!(origin.is_discovered);
        for tile in tiles.iter() {
            assert!(!tile.is_visible || tile.is_discovered);
        }
    }

    #[test]
    fn test_meeting_is_symmetric_and_sticky() {
        let human = PlayerId(0);
        let ai = PlayerId(1);
        let far = PlayerId(2);
        let mut players = vec![
            Player::new(human, "Human", PlayerKind::Human),
            Player::new(ai, "Near", PlayerKind::Ai),
            Player::new(far, "Far", PlayerKind::Ai),
        ];
        let mut all = units(&[
            (1, human, UnitKind::Warrior, Coord::new(0, 0)),
            (2, ai, UnitKind::Warrior, Coord::new(4, 0)),
            (3, far, UnitKind::Warrior, Coord::new(9, 0)),
        ]);

        let met = check_meeting(&mut players, &all, &BTreeMap::new(), human);
        assert_eq!(met, vec![ai]);
        assert!(players[0].met_players.contains(&ai));
        assert!(players[1].met_players.contains(&human));
        assert!(players[2].met_players.is_empty());

        all.get_mut(&UnitId(2)).unwrap().coord = Coord::new(20, 0);
        assert!(check_meeting(&mut players, &all, &BTreeMap::new(), human).is_empty());
        assert!(players[0].met_players.contains(&ai));
    }
}
