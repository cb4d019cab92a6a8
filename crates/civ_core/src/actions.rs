//! Player actions.
//!
//! Each action borrows the current [`GameState`] and returns a new one.
//! Validation happens before the clone, so an `Err` always means the
//! caller's state is exactly what it was.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city::{CityId, ProductionTarget, CAPTURED_CITY_HEALTH, WORK_RADIUS};
use crate::combat::{resolve_combat, resolve_siege, Engagement, SiegeOutcome};
use crate::diplomacy::{declare_war, enter_war, propose_peace, send_gift};
use crate::error::{GameError, Result};
use crate::hex::Coord;
use crate::map::Tile;
use crate::math::Fixed;
use crate::pathfinding::{can_enter, find_path, has_room_for};
use crate::player::PlayerId;
use crate::policy::{CombatContext, Policy};
use crate::state::{GameState, SYSTEM_SENDER};
use crate::tech::{Civic, Tech};
use crate::terrain::{Improvement, Terrain};
use crate::turn::end_turn;
use crate::unit::UnitId;
use crate::unit_kind::UnitKind;

/// Human founders need every other city at least this far away.
pub const FOUND_CITY_MIN_DISTANCE: u32 = 3;

/// Gold granted by a village gold reward.
pub const VILLAGE_GOLD: i32 = 50;

/// Science granted by a village science reward.
pub const VILLAGE_SCIENCE: i32 = 50;

/// Gold granted when a village scout cannot be placed.
pub const VILLAGE_FALLBACK_GOLD: i32 = 30;

/// Improvements a builder-class unit can be ordered to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImprovementAction {
    /// Build a farm.
    Farm,
    /// Build a mine.
    Mine,
    /// Build a pasture.
    Pasture,
    /// Build fishing boats.
    FishingBoats,
}

impl ImprovementAction {
    /// The improvement this order produces. Orders always build what they
    /// name, even off qualifying terrain.
    #[must_use]
    pub const fn improvement(self) -> Improvement {
        match self {
            Self::Farm => Improvement::Farm,
            Self::Mine => Improvement::Mine,
            Self::Pasture => Improvement::Pasture,
            Self::FishingBoats => Improvement::FishingBoats,
        }
    }

    /// Whether `tile` is a natural site for this improvement.
    #[must_use]
    pub fn qualifies(self, tile: &Tile) -> bool {
        let resource = tile.resource;
        match self {
            Self::Farm => matches!(tile.terrain, Terrain::Plains | Terrain::Grassland),
            Self::Mine => {
                resource.is_some_and(|r| r.is_mineable())
                    || tile.is_hill
                    || matches!(
                        tile.terrain,
                        Terrain::Plains | Terrain::Grassland | Terrain::Desert | Terrain::Tundra
                    )
            }
            Self::Pasture => resource.is_some_and(|r| r.is_pasturable()),
            Self::FishingBoats => {
                tile.terrain.is_water() && resource.is_some_and(|r| r.is_marine())
            }
        }
    }
}

/// Every state transition an external caller can request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Walk a unit along an explicit path.
    MoveAlongPath {
        /// Unit to move.
        unit: UnitId,
        /// Steps, excluding the unit's tile.
        path: Vec<Coord>,
    },
    /// Pathfind and walk toward a destination.
    MoveTo {
        /// Unit to move.
        unit: UnitId,
        /// Destination.
        dest: Coord,
    },
    /// Attack a unit.
    Attack {
        /// Attacking unit.
        attacker: UnitId,
        /// Target unit.
        defender: UnitId,
    },
    /// Attack a city.
    Siege {
        /// Attacking unit.
        attacker: UnitId,
        /// Target city.
        city: CityId,
    },
    /// Turn a settler into a city.
    FoundCity {
        /// The settler.
        unit: UnitId,
    },
    /// Buy a unit or building with gold.
    Purchase {
        /// Buying city.
        city: CityId,
        /// What to buy.
        item: ProductionTarget,
    },
    /// Order a builder to improve its tile.
    ImproveTile {
        /// The builder.
        unit: UnitId,
        /// What to build.
        action: ImprovementAction,
    },
    /// Choose what a city produces.
    SetProduction {
        /// City.
        city: CityId,
        /// New target.
        target: ProductionTarget,
    },
    /// Add or remove a worked tile.
    ToggleWorkedTile {
        /// City.
        city: CityId,
        /// Tile.
        coord: Coord,
    },
    /// Rename a city.
    RenameCity {
        /// City.
        city: CityId,
        /// New name.
        name: String,
    },
    /// Slot or unslot a policy card.
    TogglePolicy {
        /// Player.
        player: PlayerId,
        /// Policy.
        policy: Policy,
    },
    /// Pick the tech to research.
    SelectResearch {
        /// Player.
        player: PlayerId,
        /// Tech.
        tech: Tech,
    },
    /// Pick the civic to study.
    SelectCivic {
        /// Player.
        player: PlayerId,
        /// Civic.
        civic: Civic,
    },
    /// Declare war.
    DeclareWar {
        /// Aggressor.
        player: PlayerId,
        /// Target.
        target: PlayerId,
    },
    /// Offer peace.
    ProposePeace {
        /// Proposer.
        player: PlayerId,
        /// Target.
        target: PlayerId,
    },
    /// Send a gold gift.
    SendGift {
        /// Giver.
        player: PlayerId,
        /// Receiver.
        target: PlayerId,
    },
    /// Run the turn processor.
    EndTurn,
}

/// Dispatch `action` to its operation.
pub fn apply_action(state: &GameState, action: &Action) -> Result<GameState> {
    match action {
        Action::MoveAlongPath { unit, path } => move_along_path(state, *unit, path),
        Action::MoveTo { unit, dest } => move_unit_to(state, *unit, *dest),
        Action::Attack { attacker, defender } => attempt_combat(state, *attacker, *defender),
        Action::Siege { attacker, city } => attempt_siege(state, *attacker, *city),
        Action::FoundCity { unit } => found_city(state, *unit),
        Action::Purchase { city, item } => purchase(state, *city, *item),
        Action::ImproveTile { unit, action } => improve_tile(state, *unit, *action),
        Action::SetProduction { city, target } => set_production(state, *city, *target),
        Action::ToggleWorkedTile { city, coord } => toggle_worked_tile(state, *city, *coord),
        Action::RenameCity { city, name } => rename_city(state, *city, name),
        Action::TogglePolicy { player, policy } => toggle_policy(state, *player, *policy),
        Action::SelectResearch { player, tech } => select_research(state, *player, *tech),
        Action::SelectCivic { player, civic } => select_civic(state, *player, *civic),
        Action::DeclareWar { player, target } => declare_war(state, *player, *target),
        Action::ProposePeace { player, target } => propose_peace(state, *player, *target),
        Action::SendGift { player, target } => send_gift(state, *player, *target),
        Action::EndTurn => Ok(end_turn(state)),
    }
}

// ----------------------------------------------------------------------
// Movement
// ----------------------------------------------------------------------

/// Walk `unit_id` along `path` as far as its moves allow.
///
/// Every step must be adjacent to the previous one. The walk stops before
/// a tile the unit may not enter, a tile holding an enemy unit or a
/// foreign city (those are attacked, not entered), or a step it cannot
/// pay for. Entering a village claims it.
///
/// # Errors
///
/// [`GameError::InvalidAction`] if the path is malformed or not even one
/// step could be taken.
pub fn move_along_path(state: &GameState, unit_id: UnitId, path: &[Coord]) -> Result<GameState> {
    let unit = state.unit(unit_id)?;
    if path.is_empty() {
        return Err(GameError::invalid("empty path"));
    }
    if unit.moves_left == 0 {
        return Err(GameError::invalid(format!("{} has no moves left", unit.kind.name())));
    }

    let mut previous = unit.coord;
    for &step in path {
        if !previous.is_adjacent(step) || !state.tiles.contains(step) {
            return Err(GameError::invalid(format!("path step {step} is not reachable")));
        }
        previous = step;
    }

    let mut next = state.clone();
    let mut steps = 0;

    for &step in path {
        let walker = next.unit(unit_id)?.clone();
        let Some(tile) = next.tiles.get(step) else {
            break;
        };
        let cost = tile.movement_cost();

        let hostile_unit = next.units_at(step).any(|u| u.owner != walker.owner);
        let hostile_city = next.city_at(step).is_some_and(|c| c.owner != walker.owner);
        if hostile_unit || hostile_city || !can_enter(&walker, tile, &next.units) {
            break;
        }
        if walker.moves_left < cost {
            break;
        }

        let moved = next.unit_mut(unit_id)?;
        moved.coord = step;
        moved.moves_left -= cost;
        moved.is_fortified = false;
        steps += 1;

        claim_village(&mut next, unit_id)?;
    }

    if steps == 0 {
        return Err(GameError::invalid("not enough moves to take a step"));
    }

    let moves_left = next.unit(unit_id)?.moves_left;
    next.selection.unit = (moves_left > 0).then_some(unit_id);
    next.refresh_visibility();
    Ok(next)
}

/// Find a path for `unit_id` to `dest` and walk it.
pub fn move_unit_to(state: &GameState, unit_id: UnitId, dest: Coord) -> Result<GameState> {
    let unit = state.unit(unit_id)?;
    let path = find_path(unit, dest, &state.tiles, &state.units)?;
    if path.is_empty() {
        return Err(GameError::invalid("unit is already there"));
    }
    move_along_path(state, unit_id, &path)
}

/// Consume a village under `unit_id`, if any, and grant one reward.
fn claim_village(state: &mut GameState, unit_id: UnitId) -> Result<()> {
    let unit = state.unit(unit_id)?.clone();
    let has_village = state.tiles.get(unit.coord).is_some_and(|t| t.has_village);
    if !has_village {
        return Ok(());
    }
    if let Some(tile) = state.tiles.get_mut(unit.coord) {
        tile.has_village = false;
    }

    let roll: f64 = state.rng.gen();
    let reward = if roll < 0.3 {
        state.player_mut(unit.owner)?.gold += Fixed::from_num(VILLAGE_GOLD);
        format!("{VILLAGE_GOLD} gold")
    } else if roll < 0.6 {
        state.player_mut(unit.owner)?.science += Fixed::from_num(VILLAGE_SCIENCE);
        format!("{VILLAGE_SCIENCE} science")
    } else if roll < 0.8 {
        let nearest = state
            .cities_of(unit.owner)
            .min_by_key(|c| c.coord.distance(unit.coord))
            .map(|c| c.id);
        match nearest {
            Some(city_id) => {
                let city = state.city_mut(city_id)?;
                city.population += 1;
                format!("population in {}", city.name)
            }
            None => "a warm welcome".to_string(),
        }
    } else if has_room_for(unit.owner, UnitKind::Scout, unit.coord, &state.units) {
        state.spawn_unit(unit.owner, UnitKind::Scout, unit.coord);
        "a scout".to_string()
    } else {
        state.player_mut(unit.owner)?.gold += Fixed::from_num(VILLAGE_FALLBACK_GOLD);
        format!("{VILLAGE_FALLBACK_GOLD} gold")
    };

    tracing::debug!(unit = %unit_id, coord = %unit.coord, %reward, "village claimed");
    state.log(SYSTEM_SENDER, format!("Tribal village: {reward}"));
    Ok(())
}

// ----------------------------------------------------------------------
// Combat
// ----------------------------------------------------------------------

fn attack_reach(range: u32) -> u32 {
    range.max(1)
}

/// `attacker_id` attacks the unit `defender_id`.
///
/// A non-combat defender standing in a foreign city is attacked through
/// the city instead, and one sharing its tile with an enemy combat unit
/// is attacked through that escort. Attacking a player at peace declares
/// war first.
pub fn attempt_combat(state: &GameState, attacker_id: UnitId, defender_id: UnitId) -> Result<GameState> {
    let attacker = state.unit(attacker_id)?;
    let defender = state.unit(defender_id)?;

    if attacker.owner == defender.owner {
        return Err(GameError::invalid("cannot attack your own unit"));
    }
    if !attacker.is_combat() {
        return Err(GameError::invalid(format!("{} cannot attack", attacker.kind.name())));
    }
    if attacker.moves_left == 0 {
        return Err(GameError::invalid(format!("{} has no moves left", attacker.kind.name())));
    }
    let distance = attacker.coord.distance(defender.coord);
    if distance == 0 || distance > attack_reach(attacker.range) {
        return Err(GameError::invalid("target out of range"));
    }

    if !defender.is_combat() {
        if let Some(city) = state.city_at(defender.coord) {
            if city.owner != attacker.owner {
                return attempt_siege(state, attacker_id, city.id);
            }
        }
        // An escorted civilian is only reached through its escort.
        if let Some(escort) = state
            .units_at(defender.coord)
            .find(|u| u.owner != attacker.owner && u.is_combat())
        {
            return attempt_combat(state, attacker_id, escort.id);
        }
    }

    let context = CombatContext {
        defender_is_barbarian: state.player(defender.owner)?.is_barbarian(),
        attacker_in_home_territory: state
            .tiles
            .get(attacker.coord)
            .is_some_and(|t| t.owner == Some(attacker.owner)),
    };
    let bonus = state.modifiers(attacker.owner).combat_bonus(&context);
    let outcome = resolve_combat(attacker, defender, bonus);

    let (attacker, defender) = (attacker.clone(), defender.clone());
    let mut next = state.clone();
    enter_war(&mut next, attacker.owner, defender.owner)?;

    if outcome.engagement == Engagement::Capture {
        let captured = next.unit_mut(defender_id)?;
        captured.owner = attacker.owner;
        captured.moves_left = 0;
        captured.is_fortified = false;
        let victor = next.unit_mut(attacker_id)?;
        victor.coord = defender.coord;
        victor.moves_left = 0;

        tracing::info!(attacker = %attacker_id, defender = %defender_id, "unit captured");
        next.log(SYSTEM_SENDER, format!("Captured {}", defender.kind.name()));
        next.selection.unit = Some(attacker_id);
        next.refresh_visibility();
        return Ok(next);
    }

    let defender_dies = outcome.defender_dies(&defender);
    let attacker_dies = outcome.attacker_dies(&attacker);

    {
        let hit = next.unit_mut(defender_id)?;
        hit.health -= outcome.defender_damage;
    }
    {
        let striker = next.unit_mut(attacker_id)?;
        striker.health -= outcome.attacker_damage;
        striker.moves_left = 0;
        striker.is_fortified = false;
    }

    if defender_dies {
        next.units.remove(&defender_id);
        let advances = outcome.engagement == Engagement::Melee
            && !attacker_dies
            && next.city_at(defender.coord).is_none()
            && !next.units_at(defender.coord).any(|u| u.owner != attacker.owner);
        if advances {
            next.unit_mut(attacker_id)?.coord = defender.coord;
        }
    }
    if attacker_dies {
        next.units.remove(&attacker_id);
    }

    tracing::debug!(
        attacker = %attacker_id,
        defender = %defender_id,
        ?outcome,
        defender_dies,
        attacker_dies,
        "combat resolved"
    );
    next.log(
        SYSTEM_SENDER,
        format!(
            "Combat: enemy took {} damage, we took {} damage",
            outcome.defender_damage, outcome.attacker_damage
        ),
    );
    next.selection.unit = (!attacker_dies).then_some(attacker_id);
    next.refresh_visibility();
    Ok(next)
}

/// `attacker_id` attacks the city `city_id`.
///
/// A city that falls changes owner in place, drops to 50 health and
/// hands the ring around it to the attacker. Civilians inside are taken
/// with it. The attacker spends its moves either way and does not move in.
pub fn attempt_siege(state: &GameState, attacker_id: UnitId, city_id: CityId) -> Result<GameState> {
    let attacker = state.unit(attacker_id)?;
    let city = state.city(city_id)?;

    if city.owner == attacker.owner {
        return Err(GameError::invalid("cannot attack your own city"));
    }
    if !attacker.is_combat() {
        return Err(GameError::invalid(format!("{} cannot attack", attacker.kind.name())));
    }
    if attacker.moves_left == 0 {
        return Err(GameError::invalid(format!("{} has no moves left", attacker.kind.name())));
    }
    let distance = attacker.coord.distance(city.coord);
    if distance == 0 || distance > attack_reach(attacker.range) {
        return Err(GameError::invalid("city out of range"));
    }

    let outcome = resolve_siege(attacker, city);
    let (conqueror, former_owner, city_coord) = (attacker.owner, city.owner, city.coord);

    let mut next = state.clone();
    enter_war(&mut next, conqueror, former_owner)?;
    next.unit_mut(attacker_id)?.moves_left = 0;

    match outcome {
        SiegeOutcome::Damaged { damage } => {
            let city = next.city_mut(city_id)?;
            city.health -= damage;
            let text = format!("{} took {damage} damage", city.name);
            next.log(SYSTEM_SENDER, text);
        }
        SiegeOutcome::Captured => {
            next.tiles.claim_radius(city_coord, 1, conqueror);

            let tiles = &next.tiles;
            let Some(city) = next.cities.get_mut(&city_id) else {
                return Err(GameError::CityNotFound(city_id));
            };
            city.owner = conqueror;
            city.health = CAPTURED_CITY_HEALTH;
            city.worked_tiles
                .retain(|&c| tiles.get(c).is_some_and(|t| t.owner == Some(conqueror)));
            let name = city.name.clone();

            for unit in next.units.values_mut() {
                if unit.coord == city_coord && unit.owner == former_owner && !unit.is_combat() {
                    unit.owner = conqueror;
                    unit.moves_left = 0;
                }
            }

            tracing::info!(city = %city_id, %conqueror, %former_owner, "city captured");
            next.log(SYSTEM_SENDER, format!("{name} captured"));
            next.selection.unit = None;
        }
    }

    next.refresh_visibility();
    Ok(next)
}

// ----------------------------------------------------------------------
// Settling and cities
// ----------------------------------------------------------------------

/// Turn the settler `unit_id` into a city on its tile.
pub fn found_city(state: &GameState, unit_id: UnitId) -> Result<GameState> {
    let unit = state.unit(unit_id)?;
    if !unit.kind.is_settler() {
        return Err(GameError::invalid(format!("{} cannot found cities", unit.kind.name())));
    }
    if unit.moves_left == 0 {
        return Err(GameError::invalid("settler has no moves left"));
    }
    if state.city_within(unit.coord, FOUND_CITY_MIN_DISTANCE) {
        return Err(GameError::invalid("too close to another city"));
    }

    let (owner, coord) = (unit.owner, unit.coord);
    let mut next = state.clone();
    next.units.remove(&unit_id);
    let city_id = next.found_city_at(owner, coord)?;

    next.selection.unit = None;
    next.selection.city = Some(city_id);
    next.refresh_visibility();
    Ok(next)
}

fn check_target(state: &GameState, city_id: CityId, target: ProductionTarget) -> Result<()> {
    let city = state.city(city_id)?;
    let owner = state.player(city.owner)?;
    match target {
        ProductionTarget::Unit(kind) if !kind.is_producible() => {
            return Err(GameError::invalid(format!("{} cannot be produced", kind.name())));
        }
        ProductionTarget::Building(building) if city.buildings.contains(&building) => {
            return Err(GameError::invalid(format!("{} is already built", building.name())));
        }
        _ => {}
    }
    if !owner.has_unlocked(target) {
        return Err(GameError::invalid(format!("{} is not unlocked", target.name())));
    }
    Ok(())
}

/// Buy `item` in `city_id` for four times its production cost in gold.
///
/// # Errors
///
/// [`GameError::InvalidAction`] for insufficient gold or an illegal item,
/// [`GameError::NoCapacity`] if a unit has nowhere to stand. Either way
/// nothing is spent.
pub fn purchase(state: &GameState, city_id: CityId, item: ProductionTarget) -> Result<GameState> {
    check_target(state, city_id, item)?;
    let city = state.city(city_id)?;
    let price = Fixed::from_num(item.purchase_cost());
    if state.player(city.owner)?.gold < price {
        return Err(GameError::invalid(format!(
            "not enough gold to buy {} ({price} needed)",
            item.name()
        )));
    }

    let spawn = match item {
        ProductionTarget::Unit(kind) => Some((
            kind,
            state
                .find_spawn_spot(city.coord, city.owner, kind)
                .ok_or_else(|| GameError::NoCapacity(format!("no room to place {} at {}", kind.name(), city.name)))?,
        )),
        ProductionTarget::Building(_) => None,
    };

    let (owner, name) = (city.owner, city.name.clone());
    let mut next = state.clone();
    next.player_mut(owner)?.gold -= price;
    match (item, spawn) {
        (ProductionTarget::Unit(kind), Some((_, coord))) => {
            next.spawn_unit(owner, kind, coord);
        }
        (ProductionTarget::Building(building), _) => {
            next.city_mut(city_id)?.add_building(building);
        }
        (ProductionTarget::Unit(_), None) => {}
    }

    next.log(SYSTEM_SENDER, format!("{name}: purchased {}", item.name()));
    Ok(next)
}

/// Set what `city_id` produces. Accumulated production carries over.
pub fn set_production(state: &GameState, city_id: CityId, target: ProductionTarget) -> Result<GameState> {
    check_target(state, city_id, target)?;
    let mut next = state.clone();
    next.city_mut(city_id)?.production_target = Some(target);
    Ok(next)
}

/// Add `coord` to the city's worked tiles, or remove it if already worked.
pub fn toggle_worked_tile(state: &GameState, city_id: CityId, coord: Coord) -> Result<GameState> {
    let city = state.city(city_id)?;

    if let Some(index) = city.worked_tiles.iter().position(|&c| c == coord) {
        let mut next = state.clone();
        next.city_mut(city_id)?.worked_tiles.remove(index);
        return Ok(next);
    }

    let tile = state
        .tiles
        .get(coord)
        .ok_or_else(|| GameError::invalid(format!("no tile at {coord}")))?;
    if tile.owner != Some(city.owner) {
        return Err(GameError::invalid("tile is not in your territory"));
    }
    if coord == city.coord || city.coord.distance(coord) > WORK_RADIUS {
        return Err(GameError::invalid("tile is outside the city's reach"));
    }
    if city.worked_tiles.len() >= city.population as usize {
        return Err(GameError::invalid("no free citizens"));
    }
    if state.cities.values().any(|c| c.worked_tiles.contains(&coord)) {
        return Err(GameError::invalid("tile is already worked by another city"));
    }

    let mut next = state.clone();
    next.city_mut(city_id)?.worked_tiles.push(coord);
    Ok(next)
}

/// Rename `city_id`.
pub fn rename_city(state: &GameState, city_id: CityId, name: &str) -> Result<GameState> {
    state.city(city_id)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::invalid("city name cannot be empty"));
    }
    let mut next = state.clone();
    next.city_mut(city_id)?.name = name.to_string();
    Ok(next)
}

// ----------------------------------------------------------------------
// Builders
// ----------------------------------------------------------------------

/// Order the builder `unit_id` to improve its tile.
///
/// Consumes one charge and all moves. The builder is removed when its last
/// charge is spent.
pub fn improve_tile(state: &GameState, unit_id: UnitId, action: ImprovementAction) -> Result<GameState> {
    let unit = state.unit(unit_id)?;
    let Some(charges) = unit.build_charges else {
        return Err(GameError::invalid(format!("{} cannot build improvements", unit.kind.name())));
    };
    if charges == 0 {
        return Err(GameError::invalid("no build charges left"));
    }
    if unit.moves_left == 0 {
        return Err(GameError::invalid("builder has no moves left"));
    }
    let tile = state
        .tiles
        .get(unit.coord)
        .ok_or_else(|| GameError::invalid("builder is off the map"))?;

    let improvement = action.improvement();
    let natural = action.qualifies(tile);
    let coord = unit.coord;

    let mut next = state.clone();
    if let Some(tile) = next.tiles.get_mut(coord) {
        tile.improvement = Some(improvement);
    }

    let remaining = charges - 1;
    if remaining == 0 {
        next.units.remove(&unit_id);
        next.selection.unit = None;
        next.log(SYSTEM_SENDER, "Builder used its last charge");
    } else {
        let builder = next.unit_mut(unit_id)?;
        builder.build_charges = Some(remaining);
        builder.moves_left = 0;
    }

    tracing::debug!(unit = %unit_id, %coord, ?improvement, natural, "tile improved");
    next.log(SYSTEM_SENDER, format!("{improvement:?} built at {coord}"));
    Ok(next)
}

// ----------------------------------------------------------------------
// Player choices
// ----------------------------------------------------------------------

/// Slot `policy` if a slot of its category is free, or unslot it.
pub fn toggle_policy(state: &GameState, player_id: PlayerId, policy: Policy) -> Result<GameState> {
    let player = state.player(player_id)?;
    let mut next = state.clone();

    if player.active_policies.contains(&policy) {
        next.player_mut(player_id)?.active_policies.remove(&policy);
        return Ok(next);
    }

    let category = policy.category();
    let used = player
        .active_policies
        .iter()
        .filter(|p| p.category() == category)
        .count();
    if used >= category.slots() {
        return Err(GameError::invalid(format!("no free {category:?} policy slot")));
    }

    next.player_mut(player_id)?.active_policies.insert(policy);
    Ok(next)
}

/// Start researching `tech`.
pub fn select_research(state: &GameState, player_id: PlayerId, tech: Tech) -> Result<GameState> {
    let player = state.player(player_id)?;
    if player.knows(tech) {
        return Err(GameError::invalid(format!("{tech:?} is already known")));
    }
    if !tech.prerequisites().iter().all(|&t| player.knows(t)) {
        return Err(GameError::invalid(format!("{tech:?} needs its prerequisites first")));
    }
    let mut next = state.clone();
    next.player_mut(player_id)?.current_tech = Some(tech);
    Ok(next)
}

/// Start studying `civic`.
pub fn select_civic(state: &GameState, player_id: PlayerId, civic: Civic) -> Result<GameState> {
    let player = state.player(player_id)?;
    if player.researched_civics.contains(&civic) {
        return Err(GameError::invalid(format!("{civic:?} is already adopted")));
    }
    if !civic
        .prerequisites()
        .iter()
        .all(|c| player.researched_civics.contains(c))
    {
        return Err(GameError::invalid(format!("{civic:?} needs its prerequisites first")));
    }
    let mut next = state.clone();
    next.player_mut(player_id)?.current_civic = Some(civic);
    Ok(next)
}
