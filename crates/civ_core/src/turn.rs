//! The turn processor.
//!
//! # Phase Order
//!
//! Each end turn runs these phases in order. Later phases read what
//! earlier ones wrote, so the order is part of the rules:
//!
//! 1. **Selection** - clear UI pointers
//! 2. **AI** - computer players move, fight and settle
//! 3. **Barbarians** - maybe spawn one raider in the fog
//! 4. **Accrual** - empire science, culture and gold; research completion
//! 5. **Cities** - heal, produce, grow culture and borders, eat
//! 6. **Upkeep** - advance the turn counter and reset moves

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai;
use crate::buildings::Building;
use crate::city::{CityId, GrowthChange, ProductionTarget};
use crate::hex::Coord;
use crate::math::{floor_i32, Fixed};
use crate::player::{Player, PlayerId};
use crate::policy::ModifierSet;
use crate::state::{GameState, SYSTEM_SENDER};
use crate::tech::{Civic, Tech};
use crate::terrain::Terrain;
use crate::unit::UnitId;
use crate::unit_kind::UnitKind;
use crate::yields::{tile_yield_with, Yields};

/// First turn on which barbarians may appear.
pub const BARBARIAN_START_TURN: u32 = 10;

/// Chance per turn of a barbarian spawn once they are allowed.
pub const BARBARIAN_SPAWN_CHANCE: f64 = 0.15;

/// Barbarian strength on turn 0, before the per-turn ramp.
pub const BARBARIAN_BASE_STRENGTH: u32 = 18;

/// Barbarian strength never exceeds this.
pub const BARBARIAN_MAX_STRENGTH: u32 = 50;

/// Max distance from the city of a tile claimed by border growth.
pub const BORDER_RADIUS: u32 = 3;

/// What changed during one end turn.
///
/// The log carries the same information as text. These lists are for
/// callers that want to react programmatically (tests, the headless
/// runner).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvents {
    /// Units trained by cities.
    pub spawned: Vec<UnitId>,
    /// Units removed by AI strikes.
    pub destroyed: Vec<UnitId>,
    /// Units that changed hands.
    pub captured: Vec<UnitId>,
    /// Cities founded by AI settlers.
    pub cities_founded: Vec<CityId>,
    /// Buildings finished.
    pub buildings_completed: Vec<(CityId, Building)>,
    /// Cities that gained population.
    pub grown: Vec<CityId>,
    /// Cities that lost population.
    pub starved: Vec<CityId>,
    /// Tiles claimed by border growth.
    pub borders_claimed: Vec<(CityId, Coord)>,
    /// Techs completed.
    pub techs_researched: Vec<(PlayerId, Tech)>,
    /// Civics completed.
    pub civics_researched: Vec<(PlayerId, Civic)>,
    /// The barbarian raider spawned this turn.
    pub barbarian_spawn: Option<UnitId>,
    /// Finished units with nowhere to stand. The production is lost.
    pub production_cancelled: Vec<(CityId, ProductionTarget)>,
}

/// Run one end turn on `state` in place.
pub fn advance_turn(state: &mut GameState) -> TurnEvents {
    let mut events = TurnEvents::default();

    // 1. Selection
    state.selection.clear();

    // 2. AI
    ai::run_ai_turn(state, &mut events);

    // 3. Barbarians
    events.barbarian_spawn = run_barbarian_spawn(state);

    // 4. Accrual
    run_accrual(state, &mut events);

    // 5. Cities
    let city_ids: Vec<CityId> = state.cities.keys().copied().collect();
    for city_id in city_ids {
        run_city(state, city_id, &mut events);
    }

    // 6. Upkeep
    run_upkeep(state);

    state.refresh_visibility();

    #[cfg(feature = "debug-validation")]
    check_invariants(state);

    tracing::debug!(
        turn = state.turn,
        state_hash = state.state_hash(),
        spawned = events.spawned.len(),
        grown = events.grown.len(),
        techs = events.techs_researched.len(),
        "turn processed"
    );

    events
}

/// Copy-on-write end turn.
#[must_use]
pub fn end_turn(state: &GameState) -> GameState {
    let mut next = state.clone();
    advance_turn(&mut next);
    next
}

/// Strength of a barbarian raider spawned on `turn`.
#[must_use]
pub const fn barbarian_strength(turn: u32) -> u32 {
    let strength = BARBARIAN_BASE_STRENGTH + turn / 5;
    if strength > BARBARIAN_MAX_STRENGTH {
        BARBARIAN_MAX_STRENGTH
    } else {
        strength
    }
}

fn run_barbarian_spawn(state: &mut GameState) -> Option<UnitId> {
    if state.turn < BARBARIAN_START_TURN {
        return None;
    }
    let roll: f64 = state.rng.gen();
    if roll > BARBARIAN_SPAWN_CHANCE {
        return None;
    }
    let barbarians = state.barbarian_id()?;

    let candidates: Vec<Coord> = state
        .tiles
        .iter()
        .filter(|t| {
            !t.is_discovered
                && !matches!(t.terrain, Terrain::Water | Terrain::Mountain | Terrain::Snow)
                && state.units_at(t.coord).next().is_none()
                && state.city_at(t.coord).is_none()
        })
        .map(|t| t.coord)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let coord = candidates[state.rng.gen_range(0..candidates.len())];
    let id = state.spawn_unit(barbarians, UnitKind::BarbarianWarrior, coord);
    let strength = barbarian_strength(state.turn);
    if let Some(unit) = state.units.get_mut(&id) {
        unit.strength = strength;
    }

    tracing::debug!(turn = state.turn, %coord, strength, "barbarians appeared");
    Some(id)
}

/// Science, culture and gold an empire produces this turn.
fn empire_yield(state: &GameState, player: &Player, modifiers: &ModifierSet) -> Yields {
    let mut total = Yields::ZERO;
    let mut has_city = false;

    for city in state.cities_of(player.id) {
        has_city = true;
        if let Some(center) = state.tiles.get(city.coord) {
            total += tile_yield_with(center, Some(player), modifiers);
            total += Yields::ints(0, 0, 0, 1, 1);
        }
        total += city
            .worked_tiles
            .iter()
            .filter_map(|&c| state.tiles.get(c))
            .map(|t| tile_yield_with(t, Some(player), modifiers))
            .sum();
        total += city.buildings.iter().map(|b| b.yields()).sum();
        total += modifiers.city_bonus();
    }

    if has_city {
        total += modifiers.turn_bonus();
    }
    total
}

fn run_accrual(state: &mut GameState, events: &mut TurnEvents) {
    let totals: Vec<(PlayerId, Yields)> = state
        .players
        .iter()
        .map(|p| (p.id, empire_yield(state, p, &ModifierSet::for_player(p))))
        .collect();

    let mut completions = Vec::new();
    for (id, total) in totals {
        let Ok(player) = state.player_mut(id) else {
            continue;
        };
        player.science += total.science;
        player.culture += total.culture;
        player.gold += total.gold;
        player.science_yield = floor_i32(total.science);
        player.culture_yield = floor_i32(total.culture);
        player.gold_yield = floor_i32(total.gold);

        if let Some(tech) = player.current_tech {
            let cost = Fixed::from_num(tech.cost());
            if player.science >= cost {
                player.science -= cost;
                player.researched_techs.insert(tech);
                player.current_tech = None;
                events.techs_researched.push((id, tech));
                completions.push((id, format!("{tech:?} researched")));
                tracing::info!(player = %id, ?tech, "tech researched");
            }
        }
        if let Some(civic) = player.current_civic {
            let cost = Fixed::from_num(civic.cost());
            if player.culture >= cost {
                player.culture -= cost;
                player.researched_civics.insert(civic);
                player.current_civic = None;
                events.civics_researched.push((id, civic));
                completions.push((id, format!("{civic:?} adopted")));
                tracing::info!(player = %id, ?civic, "civic adopted");
            }
        }
    }

    for (id, text) in completions {
        let name = state.player(id).map(|p| p.name.clone()).unwrap_or_default();
        state.log(&name, text);
    }

    // Computer players queue their next pick right away.
    let computers: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.is_computer() && !p.is_barbarian())
        .map(|p| p.id)
        .collect();
    for id in computers {
        let tech = ai::choose_research(state, id);
        let civic = ai::choose_civic(state, id);
        if let Ok(player) = state.player_mut(id) {
            player.current_tech = player.current_tech.or(tech);
            player.current_civic = player.current_civic.or(civic);
        }
    }
}

/// Production and food a city yields this turn, before production bonuses.
fn city_output(state: &GameState, city_id: CityId) -> Option<(Fixed, Fixed)> {
    let city = state.cities.get(&city_id)?;
    let owner = state.player(city.owner).ok()?;
    let modifiers = ModifierSet::for_player(owner);

    let mut production = Fixed::ZERO;
    let mut food = Fixed::ZERO;

    if let Some(center) = state.tiles.get(city.coord) {
        let y = tile_yield_with(center, Some(owner), &modifiers);
        production += y.production.max(Fixed::ONE);
        food += y.food.max(Fixed::from_num(2));
    }
    for tile in city.worked_tiles.iter().filter_map(|&c| state.tiles.get(c)) {
        let y = tile_yield_with(tile, Some(owner), &modifiers);
        production += y.production;
        food += y.food;
    }
    for building in &city.buildings {
        let y = building.yields();
        production += y.production;
        food += y.food;
    }
    let bonus = modifiers.city_bonus();
    Some((production + bonus.production, food + bonus.food))
}

fn run_city(state: &mut GameState, city_id: CityId, events: &mut TurnEvents) {
    let Some((raw_production, food)) = city_output(state, city_id) else {
        return;
    };
    let Some(city) = state.cities.get(&city_id) else {
        return;
    };
    let owner = city.owner;
    let modifiers = state.modifiers(owner);
    let is_computer = state.player(owner).is_ok_and(|p| p.is_computer());

    let production = match city.production_target {
        Some(ProductionTarget::Unit(kind)) => modifiers.production_toward(kind, raw_production),
        _ => raw_production,
    };

    let Ok(city) = state.city_mut(city_id) else {
        return;
    };
    city.heal();
    city.production += production;
    let finished = city.production_ready();
    if finished.is_some() {
        city.production = Fixed::ZERO;
        city.production_target = None;
    }

    if let Some(target) = finished {
        complete_production(state, city_id, target, events);
        if is_computer {
            let next = ai::choose_production(state, city_id);
            if let Ok(city) = state.city_mut(city_id) {
                city.production_target = next;
            }
        }
    }

    // Culture reads the population before this turn's growth.
    let borders_grow = state
        .city_mut(city_id)
        .is_ok_and(|city| city.accumulate_culture());
    if borders_grow {
        if let Some(coord) = claim_border(state, city_id) {
            events.borders_claimed.push((city_id, coord));
        }
    }

    let Ok(city) = state.city_mut(city_id) else {
        return;
    };
    let surplus = food - city.food_consumption();
    let change = city.apply_food(surplus);
    let (name, population) = (city.name.clone(), city.population);
    match change {
        GrowthChange::Grew => {
            events.grown.push(city_id);
            state.log(SYSTEM_SENDER, format!("{name} grew to {population}"));
            if is_computer {
                if let Err(err) = ai::assign_best_tile(state, city_id) {
                    tracing::warn!(city = %city_id, %err, "could not assign worked tile");
                }
            }
        }
        GrowthChange::Starved => {
            events.starved.push(city_id);
            state.log(SYSTEM_SENDER, format!("{name} is starving"));
        }
        GrowthChange::Steady => {}
    }
}

fn complete_production(
    state: &mut GameState,
    city_id: CityId,
    target: ProductionTarget,
    events: &mut TurnEvents,
) {
    let Some(city) = state.cities.get(&city_id) else {
        return;
    };
    let (owner, center, name) = (city.owner, city.coord, city.name.clone());

    match target {
        ProductionTarget::Unit(kind) => match state.find_spawn_spot(center, owner, kind) {
            Some(coord) => {
                let id = state.spawn_unit(owner, kind, coord);
                events.spawned.push(id);
                state.log(SYSTEM_SENDER, format!("{name}: {} trained", kind.name()));
            }
            None => {
                tracing::warn!(city = %city_id, ?kind, "no room to place finished unit");
                events.production_cancelled.push((city_id, target));
                state.log(SYSTEM_SENDER, format!("{name}: no room to place {}", kind.name()));
            }
        },
        ProductionTarget::Building(building) => {
            if let Some(city) = state.cities.get_mut(&city_id) {
                city.add_building(building);
            }
            events.buildings_completed.push((city_id, building));
            state.log(SYSTEM_SENDER, format!("{name}: {} built", building.name()));
        }
    }
}

/// Give the city's owner the nearest unowned tile within [`BORDER_RADIUS`].
fn claim_border(state: &mut GameState, city_id: CityId) -> Option<Coord> {
    let city = state.cities.get(&city_id)?;
    let (center, owner) = (city.coord, city.owner);

    let coord = center
        .within(BORDER_RADIUS)
        .into_iter()
        .filter(|&c| state.tiles.get(c).is_some_and(|t| t.owner.is_none()))
        .min_by_key(|&c| (center.distance(c), c))?;

    let tile = state.tiles.get_mut(coord)?;
    tile.owner = Some(owner);
    tracing::debug!(city = %city_id, %coord, "borders grew");
    Some(coord)
}

fn run_upkeep(state: &mut GameState) {
    state.turn += 1;

    let modifiers: BTreeMap<PlayerId, ModifierSet> = state
        .players
        .iter()
        .map(|p| (p.id, ModifierSet::for_player(p)))
        .collect();

    for unit in state.units.values_mut() {
        if let Some(set) = modifiers.get(&unit.owner) {
            unit.max_moves = set.max_moves(unit.kind);
        }
        unit.moves_left = unit.max_moves;
    }
}

#[cfg(feature = "debug-validation")]
fn check_invariants(state: &GameState) {
    for tile in state.tiles.iter() {
        debug_assert!(!tile.is_visible || tile.is_discovered, "visible but undiscovered: {}", tile.coord);
    }
    for city in state.cities.values() {
        debug_assert!(city.population >= 1);
        debug_assert!(city.food >= Fixed::from_num(crate::city::FOOD_FLOOR));
        debug_assert!(city.worked_tiles.len() <= city.population as usize);
    }
    for unit in state.units.values() {
        debug_assert!(unit.health > 0, "dead unit {} left on the map", unit.id);
        debug_assert!(unit.moves_left <= unit.max_moves);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Tile, TileMap};
    use crate::player::PlayerKind;
    use crate::policy::Policy;

    const HUMAN: PlayerId = PlayerId(0);
    const BARBS: PlayerId = PlayerId(1);

    fn state() -> GameState {
        let tiles: TileMap = Coord::new(0, 0)
            .within(6)
            .into_iter()
            .map(|c| Tile::new(c, Terrain::Grassland))
            .collect();
        let players = vec![
            Player::new(HUMAN, "Ada", PlayerKind::Human),
            Player::new(BARBS, "Barbarians", PlayerKind::Barbarian),
        ];
        GameState::new(tiles, players, 5)
    }

    #[test]
    fn test_turn_advances_and_resets() {
        let mut s = state();
        let w = s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(0, 0));
        s.selection.unit = Some(w);
        let next = end_turn(&s);
        assert_eq!(next.turn, 2);
        assert_eq!(next.selection, crate::state::Selection::default());
        assert_eq!(next.unit(w).unwrap().moves_left, 2);
        assert_eq!(s.turn, 1);
    }

    #[test]
    fn test_movement_policy_applies_at_reset() {
        let mut s = state();
        s.player_mut(HUMAN).unwrap().active_policies.insert(Policy::Survey);
        let scout = s.spawn_unit(HUMAN, UnitKind::Scout, Coord::new(0, 0));
        let s = end_turn(&s);
        assert_eq!(s.unit(scout).unwrap().moves_left, 4);
    }

    #[test]
    fn test_city_heals() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        s.city_mut(city).unwrap().health = 100;
        let s = end_turn(&s);
        assert_eq!(s.city(city).unwrap().health, 105);
    }

    #[test]
    fn test_unit_completes_and_waits() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        s.city_mut(city).unwrap().production = Fixed::from_num(27);
        let mut events = advance_turn(&mut s);
        assert_eq!(events.spawned.len(), 1);
        let unit = s.unit(events.spawned.remove(0)).unwrap();
        assert_eq!(unit.kind, UnitKind::Warrior);
        assert_eq!(unit.coord, Coord::new(0, 0));
        let c = s.city(city).unwrap();
        assert_eq!(c.production, Fixed::ZERO);
        assert_eq!(c.production_target, None);
    }

    #[test]
    fn test_inland_city_completes_fighter() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        let c = s.city_mut(city).unwrap();
        c.production_target = Some(ProductionTarget::Unit(UnitKind::Fighter));
        c.production = Fixed::from_num(400);
        let events = advance_turn(&mut s);
        assert!(events.production_cancelled.is_empty());
        assert_eq!(events.spawned.len(), 1);
        let fighter = s.unit(events.spawned[0]).unwrap();
        assert_eq!(fighter.kind, UnitKind::Fighter);
        assert_eq!(fighter.coord, Coord::new(0, 0));
    }

    #[test]
    fn test_idle_city_keeps_accumulating() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        s.city_mut(city).unwrap().production_target = None;
        advance_turn(&mut s);
        advance_turn(&mut s);
        assert_eq!(s.city(city).unwrap().production, Fixed::from_num(2));
    }

    #[test]
    fn test_no_capacity_cancels() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(0, 0));
        for n in Coord::new(0, 0).neighbors() {
            s.spawn_unit(HUMAN, UnitKind::Warrior, n);
        }
        s.city_mut(city).unwrap().production = Fixed::from_num(30);
        let before = s.units.len();

        let events = advance_turn(&mut s);
        assert_eq!(
            events.production_cancelled,
            vec![(city, ProductionTarget::Unit(UnitKind::Warrior))]
        );
        assert_eq!(s.units.len(), before);
        let c = s.city(city).unwrap();
        assert_eq!(c.production_target, None);
        assert_eq!(c.production, Fixed::ZERO);
    }

    #[test]
    fn test_walls_raise_max_health() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        let c = s.city_mut(city).unwrap();
        c.production_target = Some(ProductionTarget::Building(Building::AncientWalls));
        c.production = Fixed::from_num(56);
        let events = advance_turn(&mut s);
        assert_eq!(events.buildings_completed, vec![(city, Building::AncientWalls)]);
        assert_eq!(s.city(city).unwrap().max_health, 300);
    }

    #[test]
    fn test_growth_resets_food() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        s.tiles.set_river_between(Coord::new(0, 0), Coord::new(1, 0));
        s.city_mut(city).unwrap().food = Fixed::from_num(14);
        let events = advance_turn(&mut s);
        assert_eq!(events.grown, vec![city]);
        let c = s.city(city).unwrap();
        assert_eq!(c.population, 2);
        assert_eq!(c.food, Fixed::ZERO);
    }

    #[test]
    fn test_starvation_floor() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        {
            let c = s.city_mut(city).unwrap();
            c.population = 2;
            c.food = Fixed::from_num(-19);
        }
        let events = advance_turn(&mut s);
        assert_eq!(events.starved, vec![city]);
        let c = s.city(city).unwrap();
        assert_eq!(c.population, 1);
        assert_eq!(c.food, Fixed::ZERO);
    }

    #[test]
    fn test_border_claims_nearest_unowned() {
        let mut s = state();
        let city = s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        let threshold = s.city(city).unwrap().culture_threshold;
        s.city_mut(city).unwrap().culture_stored = threshold - Fixed::ONE;
        let events = advance_turn(&mut s);
        assert_eq!(events.borders_claimed, vec![(city, Coord::new(-2, 0))]);
        assert_eq!(s.tiles.get(Coord::new(-2, 0)).unwrap().owner, Some(HUMAN));
        let c = s.city(city).unwrap();
        assert_eq!(c.culture_stored, Fixed::ZERO);
        assert!(c.culture_threshold > threshold);
    }

    #[test]
    fn test_accrual_and_research() {
        let mut s = state();
        s.found_city_at(HUMAN, Coord::new(0, 0)).unwrap();
        {
            let p = s.player_mut(HUMAN).unwrap();
            p.current_tech = Some(Tech::Pottery);
            p.science = Fixed::from_num(24);
            p.active_policies.insert(Policy::Strategos);
        }
        let events = advance_turn(&mut s);
        assert_eq!(events.techs_researched, vec![(HUMAN, Tech::Pottery)]);
        let p = s.player(HUMAN).unwrap();
        assert!(p.knows(Tech::Pottery));
        assert_eq!(p.current_tech, None);
        assert_eq!(p.science, Fixed::ZERO);
        assert_eq!(p.science_yield, 1);
        assert_eq!(p.culture_yield, 1);
        assert_eq!(p.gold_yield, 2);
    }

    #[test]
    fn test_turn_bonus_needs_a_city() {
        let mut s = state();
        s.player_mut(HUMAN).unwrap().active_policies.insert(Policy::Strategos);
        advance_turn(&mut s);
        assert_eq!(s.player(HUMAN).unwrap().gold, Fixed::ZERO);
    }

    #[test]
    fn test_no_barbarians_before_turn_ten() {
        let mut s = state();
        for _ in 1..BARBARIAN_START_TURN {
            assert_eq!(advance_turn(&mut s).barbarian_spawn, None);
        }
    }

    #[test]
    fn test_barbarians_spawn_in_fog() {
        let mut s = state();
        s.spawn_unit(HUMAN, UnitKind::Warrior, Coord::new(0, 0));
        s.refresh_visibility();
        s.turn = 40;

        let spawned = (0..300).find_map(|_| {
            let turn = s.turn;
            let fog = s.clone();
            advance_turn(&mut s).barbarian_spawn.map(|id| (id, turn, fog))
        });
        let (id, turn, before) = spawned.expect("no barbarian in 300 turns");
        let raider = s.unit(id).unwrap();
        assert_eq!(raider.owner, BARBS);
        assert_eq!(raider.kind, UnitKind::BarbarianWarrior);
        assert_eq!(raider.strength, barbarian_strength(turn));
        assert!(!before.tiles.get(raider.coord).unwrap().is_discovered);
    }

    #[test]
    fn test_barbarian_strength_caps() {
        assert_eq!(barbarian_strength(10), 20);
        assert_eq!(barbarian_strength(100), 38);
        assert_eq!(barbarian_strength(1000), BARBARIAN_MAX_STRENGTH);
    }
}
