//! Heuristic mover and city governor for computer players.
//!
//! Single-step lookahead, no target selection. Each unit either engages an
//! adjacent enemy, wanders one step, or (for settlers) rolls to settle.
//! Cities pick production from a fixed priority list.

use rand::Rng;

use crate::buildings::Building;
use crate::city::{CityId, ProductionTarget, WORK_RADIUS};
use crate::diplomacy::enter_war;
use crate::error::Result;
use crate::hex::Coord;
use crate::math::Fixed;
use crate::pathfinding::can_enter;
use crate::player::PlayerId;
use crate::state::GameState;
use crate::tech::{Civic, Tech};
use crate::turn::TurnEvents;
use crate::unit::UnitId;
use crate::unit_kind::UnitKind;
use crate::yields::tile_yield_with;

/// Flat damage an AI unit deals to an adjacent enemy.
pub const STRIKE_DAMAGE: i32 = 20;

/// Chance per turn that an AI settler founds a city where it stands.
pub const SETTLE_CHANCE: f64 = 0.2;

/// AI settlers need every other city at least this far away.
pub const SETTLE_MIN_DISTANCE: u32 = 4;

/// AI empires stop training settlers at this many cities.
pub const TARGET_CITY_COUNT: usize = 3;

/// What a unit decided to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Capture(UnitId),
    Strike(UnitId),
    Wander(Coord),
    Idle,
}

/// Move every unit of every computer player, in player then id order.
///
/// A unit whose move fails is logged and skipped; the rest still move.
pub(crate) fn run_ai_turn(state: &mut GameState, events: &mut TurnEvents) {
    let computers: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.is_computer())
        .map(|p| p.id)
        .collect();

    for player in computers {
        let unit_ids: Vec<UnitId> = state.units_of(player).map(|u| u.id).collect();
        for unit_id in unit_ids {
            // Earlier units may have destroyed or captured this one.
            let still_ours = state.units.get(&unit_id).is_some_and(|u| u.owner == player);
            if !still_ours {
                continue;
            }
            if let Err(err) = move_unit(state, player, unit_id, events) {
                tracing::warn!(%player, unit = %unit_id, %err, "ai unit skipped");
            }
        }
    }
}

fn move_unit(
    state: &mut GameState,
    player: PlayerId,
    unit_id: UnitId,
    events: &mut TurnEvents,
) -> Result<()> {
    {
        let unit = state.unit_mut(unit_id)?;
        unit.moves_left = unit.max_moves;
    }

    let decision = decide(state, unit_id)?;
    tracing::trace!(%player, unit = %unit_id, ?decision, "ai decision");

    match decision {
        Decision::Capture(target) => {
            let (target_owner, target_coord) = {
                let t = state.unit(target)?;
                (t.owner, t.coord)
            };
            enter_war(state, player, target_owner)?;
            let captured = state.unit_mut(target)?;
            captured.owner = player;
            captured.moves_left = 0;
            let unit = state.unit_mut(unit_id)?;
            unit.coord = target_coord;
            unit.moves_left = 0;
            events.captured.push(target);
        }
        Decision::Strike(target) => {
            let target_owner = state.unit(target)?.owner;
            enter_war(state, player, target_owner)?;
            state.unit_mut(unit_id)?.moves_left = 0;
            let victim = state.unit_mut(target)?;
            victim.health -= STRIKE_DAMAGE;
            if victim.is_dead() {
                state.units.remove(&target);
                events.destroyed.push(target);
            }
        }
        Decision::Wander(dest) => {
            let cost = state.tiles.get(dest).map_or(1, |t| t.movement_cost());
            let unit = state.unit_mut(unit_id)?;
            unit.coord = dest;
            unit.moves_left = unit.moves_left.saturating_sub(cost);
        }
        Decision::Idle => {}
    }

    maybe_settle(state, player, unit_id, events)
}

fn decide(state: &mut GameState, unit_id: UnitId) -> Result<Decision> {
    let unit = state.unit(unit_id)?;

    if unit.is_combat() {
        // Civilians sheltering in a city are reached through siege, which
        // the heuristic never attempts.
        let target = state.units.values().find(|other| {
            other.owner != unit.owner
                && unit.coord.is_adjacent(other.coord)
                && (other.is_combat() || state.city_at(other.coord).is_none())
        });
        if let Some(target) = target {
            // Capture only an unescorted tile.
            let escort = state
                .units_at(target.coord)
                .find(|o| o.owner != unit.owner && o.is_combat());
            return Ok(match escort {
                Some(escort) => Decision::Strike(escort.id),
                None => Decision::Capture(target.id),
            });
        }
    }

    if unit.moves_left == 0 {
        return Ok(Decision::Idle);
    }

    let options: Vec<Coord> = unit
        .coord
        .neighbors()
        .into_iter()
        .filter(|&n| {
            let Some(tile) = state.tiles.get(n) else {
                return false;
            };
            can_enter(unit, tile, &state.units)
                && !state.units_at(n).any(|o| o.owner != unit.owner)
                && !state.city_at(n).is_some_and(|c| c.owner != unit.owner)
        })
        .collect();

    if options.is_empty() {
        return Ok(Decision::Idle);
    }
    let pick = state.rng.gen_range(0..options.len());
    Ok(Decision::Wander(options[pick]))
}

fn maybe_settle(
    state: &mut GameState,
    player: PlayerId,
    unit_id: UnitId,
    events: &mut TurnEvents,
) -> Result<()> {
    let Some(unit) = state.units.get(&unit_id) else {
        return Ok(());
    };
    if !unit.kind.is_settler() || unit.owner != player || state.player(player)?.is_barbarian() {
        return Ok(());
    }
    let coord = unit.coord;

    let roll: f64 = state.rng.gen();
    if roll <= 1.0 - SETTLE_CHANCE || state.city_within(coord, SETTLE_MIN_DISTANCE) {
        return Ok(());
    }

    state.units.remove(&unit_id);
    let city = state.found_city_at(player, coord)?;
    tracing::trace!(%player, %city, %coord, "ai settled");
    events.cities_founded.push(city);
    Ok(())
}

/// Pick the next production target for an AI city.
///
/// Settlers until the empire has three cities, then a garrison of two
/// military units per city, then the first missing building, then the
/// strongest unit available.
#[must_use]
pub fn choose_production(state: &GameState, city_id: CityId) -> Option<ProductionTarget> {
    let city = state.cities.get(&city_id)?;
    let owner = state.player(city.owner).ok()?;

    let city_count = state.cities_of(owner.id).count();
    let settler_exists = state.units_of(owner.id).any(|u| u.kind.is_settler());
    if city_count < TARGET_CITY_COUNT && !settler_exists {
        return Some(ProductionTarget::Unit(UnitKind::Settler));
    }

    let strongest = UnitKind::ALL
        .iter()
        .copied()
        .filter(|k| k.is_land_military() && k.is_producible())
        .filter(|&k| owner.has_unlocked(ProductionTarget::Unit(k)))
        .max_by_key(|k| (k.stats().strength, std::cmp::Reverse(k.stats().cost)))
        .map(ProductionTarget::Unit);

    let military = state
        .units_of(owner.id)
        .filter(|u| u.kind.is_land_military())
        .count();
    if military < 2 * city_count {
        if let Some(target) = strongest {
            return Some(target);
        }
    }

    let building = Building::ALL
        .iter()
        .copied()
        .find(|&b| !city.buildings.contains(&b) && owner.has_unlocked(ProductionTarget::Building(b)))
        .map(ProductionTarget::Building);

    building.or(strongest)
}

/// Work the best free tile for an AI city, if it has an idle citizen.
///
/// Food counts double. Ties go to the lowest coordinate.
pub(crate) fn assign_best_tile(state: &mut GameState, city_id: CityId) -> Result<()> {
    let city = state.city(city_id)?;
    if city.worked_tiles.len() >= city.population as usize {
        return Ok(());
    }
    let owner = state.player(city.owner)?;
    let modifiers = state.modifiers(owner.id);

    let mut best: Option<(Fixed, Coord)> = None;
    for coord in city.coord.within(WORK_RADIUS) {
        if coord == city.coord {
            continue;
        }
        let Some(tile) = state.tiles.get(coord) else {
            continue;
        };
        if tile.owner != Some(owner.id) || state.cities.values().any(|c| c.worked_tiles.contains(&coord)) {
            continue;
        }
        let y = tile_yield_with(tile, Some(owner), &modifiers);
        let score = y.food * 2 + y.production + y.gold + y.science + y.culture;
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, coord));
        }
    }

    if let Some((_, coord)) = best {
        tracing::trace!(city = %city_id, %coord, "ai works tile");
        state.city_mut(city_id)?.worked_tiles.push(coord);
    }
    Ok(())
}

/// First researchable tech in tree order.
#[must_use]
pub fn choose_research(state: &GameState, player: PlayerId) -> Option<Tech> {
    let player = state.player(player).ok()?;
    Tech::ALL
        .iter()
        .copied()
        .find(|&t| !player.knows(t) && t.prerequisites().iter().all(|&p| player.knows(p)))
}

/// First available civic in tree order.
#[must_use]
pub fn choose_civic(state: &GameState, player: PlayerId) -> Option<Civic> {
    let player = state.player(player).ok()?;
    Civic::ALL.iter().copied().find(|c| {
        !player.researched_civics.contains(c)
            && c.prerequisites()
                .iter()
                .all(|p| player.researched_civics.contains(p))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Tile, TileMap};
    use crate::player::{Player, PlayerKind};
    use crate::terrain::Terrain;

    const HUMAN: PlayerId = PlayerId(0);
    const AI: PlayerId = PlayerId(1);
    const BARBS: PlayerId = PlayerId(2);

    fn state() -> GameState {
        let tiles: TileMap = Coord::new(0, 0)
            .within(5)
            .into_iter()
            .map(|c| Tile::new(c, Terrain::Grassland))
            .collect();
        let players = vec![
            Player::new(HUMAN, "Ada", PlayerKind::Human),
            Player::new(AI, "Cleopatra", PlayerKind::Ai),
            Player::new(BARBS, "Barbarians", PlayerKind::Barbarian),
        ];
        GameState::new(tiles, players, 3)
    }

    #[test]
    fn test_strike_deals_flat_damage() {
        let mut s = state();
        let ai = s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 0));
        let target = s.spawn_unit(HUMAN, UnitKind::Tank, Coord::new(1, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);

        assert_eq!(s.unit(target).unwrap().health, 100 - STRIKE_DAMAGE);
        assert_eq!(s.unit(ai).unwrap().moves_left, 0);
        assert_eq!(s.unit(ai).unwrap().coord, Coord::new(0, 0));
        assert!(s.player(AI).unwrap().is_at_war_with(HUMAN));
    }

    #[test]
    fn test_strike_can_kill() {
        let mut s = state();
        s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 0));
        let target = s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(1, 0));
        s.unit_mut(target).unwrap().health = 15;
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);
        assert!(s.unit(target).is_err());
        assert_eq!(events.destroyed, vec![target]);
    }

    #[test]
    fn test_capture_civilian() {
        let mut s = state();
        let ai = s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 0));
        let builder = s.spawn_unit(HUMAN, UnitKind::Builder, Coord::new(1, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);

        let taken = s.unit(builder).unwrap();
        assert_eq!(taken.owner, AI);
        assert_eq!(taken.health, 100);
        assert_eq!(s.unit(ai).unwrap().coord, Coord::new(1, 0));
        assert_eq!(events.captured, vec![builder]);
    }

    #[test]
    fn test_escorted_civilian_is_not_captured() {
        let mut s = state();
        let ai = s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 0));
        let settler = s.spawn_unit(HUMAN, UnitKind::Settler, Coord::new(1, 0));
        let escort = s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(1, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);

        assert_eq!(s.unit(settler).unwrap().owner, HUMAN);
        assert_eq!(s.unit(escort).unwrap().health, 100 - STRIKE_DAMAGE);
        assert_eq!(s.unit(ai).unwrap().coord, Coord::new(0, 0));
        assert!(events.captured.is_empty());
    }

    #[test]
    fn test_failed_unit_does_not_stall_others() {
        let mut s = state();
        s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 0));
        s.spawn_unit(PlayerId(9), UnitKind::Warrior, Coord::new(1, 0));
        let mover = s.spawn_unit(AI, UnitKind::Warrior, Coord::new(-4, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);

        assert_ne!(s.unit(mover).unwrap().coord, Coord::new(-4, 0));
    }

    #[test]
    fn test_civilians_never_engage() {
        let mut s = state();
        let settler = s.spawn_unit(AI, UnitKind::Settler, Coord::new(0, 0));
        let enemy = s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(1, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);
        assert_eq!(s.unit(enemy).unwrap().health, 100);
        if let Ok(settler) = s.unit(settler) {
            assert_ne!(settler.coord, Coord::new(1, 0));
        }
    }

    #[test]
    fn test_wander_stays_on_legal_tiles() {
        let mut s = state();
        for n in Coord::new(0, 0).neighbors() {
            s.tiles.insert(Tile::new(n, Terrain::Water));
        }
        s.tiles.insert(Tile::new(Coord::new(1, 0), Terrain::Plains));
        let scout = s.spawn_unit(AI, UnitKind::Scout, Coord::new(0, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);
        let unit = s.unit(scout).unwrap();
        assert_eq!(unit.coord, Coord::new(1, 0));
        assert_eq!(unit.moves_left, 2);
    }

    #[test]
    fn test_human_units_untouched() {
        let mut s = state();
        let mine = s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(0, 0));
        let mut events = TurnEvents::default();
        run_ai_turn(&mut s, &mut events);
        let unit = s.unit(mine).unwrap();
        assert_eq!(unit.coord, Coord::new(0, 0));
        assert_eq!(unit.moves_left, 0);
    }

    #[test]
    fn test_barbarians_never_settle() {
        let mut s = state();
        s.spawn_unit(BARBS, UnitKind::Settler, Coord::new(0, 0));
        for _ in 0..30 {
            let mut events = TurnEvents::default();
            run_ai_turn(&mut s, &mut events);
        }
        assert!(s.cities.is_empty());
    }

    #[test]
    fn test_settler_eventually_settles_away_from_cities() {
        let mut s = state();
        s.spawn_unit(AI, UnitKind::Settler, Coord::new(0, 0));
        let mut founded = Vec::new();
        for _ in 0..60 {
            let mut events = TurnEvents::default();
            run_ai_turn(&mut s, &mut events);
            founded.extend(events.cities_founded);
        }
        assert_eq!(founded.len(), 1);
        let city = s.city(founded[0]).unwrap();
        assert_eq!(city.owner, AI);
        assert!(s.units_of(AI).all(|u| !u.kind.is_settler()));
    }

    #[test]
    fn test_production_priorities() {
        let mut s = state();
        let city = s.found_city_at(AI, Coord::new(0, 0)).unwrap();
        assert_eq!(
            choose_production(&s, city),
            Some(ProductionTarget::Unit(UnitKind::Settler))
        );

        s.spawn_unit(AI, UnitKind::Settler, Coord::new(1, 0));
        assert_eq!(
            choose_production(&s, city),
            Some(ProductionTarget::Unit(UnitKind::Warrior))
        );

        s.spawn_unit(AI, UnitKind::Warrior, Coord::new(1, 0));
        s.spawn_unit(AI, UnitKind::Warrior, Coord::new(0, 1));
        assert_eq!(
            choose_production(&s, city),
            Some(ProductionTarget::Building(Building::Monument))
        );
    }

    #[test]
    fn test_best_tile_by_score() {
        let mut s = state();
        let city = s.found_city_at(AI, Coord::new(0, 0)).unwrap();
        s.tiles.get_mut(Coord::new(1, -1)).unwrap().is_hill = true;
        assign_best_tile(&mut s, city).unwrap();
        assert_eq!(s.city(city).unwrap().worked_tiles, vec![Coord::new(1, -1)]);

        // One citizen, one tile.
        assign_best_tile(&mut s, city).unwrap();
        assert_eq!(s.city(city).unwrap().worked_tiles.len(), 1);
    }

    #[test]
    fn test_best_tile_ties_break_low() {
        let mut s = state();
        let city = s.found_city_at(AI, Coord::new(0, 0)).unwrap();
        assign_best_tile(&mut s, city).unwrap();
        assert_eq!(s.city(city).unwrap().worked_tiles, vec![Coord::new(-1, 0)]);
    }

    #[test]
    fn test_research_picks_roots_first() {
        let s = state();
        let tech = choose_research(&s, AI).unwrap();
        assert!(tech.prerequisites().is_empty());
        assert_eq!(choose_civic(&s, AI), Some(Civic::CodeOfLaws));
    }
}
