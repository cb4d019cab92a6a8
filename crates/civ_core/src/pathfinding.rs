//! Hex-grid pathfinding using the A* algorithm.
//!
//! Edge costs are whole terrain costs and the heuristic is hex distance,
//! which never overestimates since every step costs at least 1. Ties in
//! the open set are broken on coordinates so results are reproducible.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::error::{GameError, Result};
use crate::hex::Coord;
use crate::map::{Tile, TileMap};
use crate::player::PlayerId;
use crate::terrain::IMPASSABLE_COST;
use crate::unit::{Unit, UnitId};
use crate::unit_kind::{Domain, UnitKind};

/// Whether `unit` may step onto `tile`.
///
/// Domain first (air ignores everything else), then terrain cost, then
/// stacking. A tile holding an enemy unit is always enterable, as the
/// approach to an attack. Among friendly occupants, at most one combat
/// and one non-combat unit may share a tile.
#[must_use]
pub fn can_enter(unit: &Unit, tile: &Tile, units: &BTreeMap<UnitId, Unit>) -> bool {
    match unit.domain() {
        Domain::Land if tile.terrain.is_water() => return false,
        Domain::Sea if !tile.terrain.is_water() => return false,
        Domain::Air => return true,
        _ => {}
    }

    if tile.movement_cost() >= IMPASSABLE_COST {
        return false;
    }

    let mut occupants = units
        .values()
        .filter(|other| other.coord == tile.coord && other.id != unit.id)
        .peekable();

    if occupants.peek().is_none() {
        return true;
    }

    let occupants: Vec<&Unit> = occupants.collect();
    if occupants.iter().any(|other| other.owner != unit.owner) {
        return true;
    }

    let mover_is_combat = unit.kind.is_combat();
    !occupants
        .iter()
        .any(|other| other.kind.is_combat() == mover_is_combat)
}

/// Whether a new unit of `kind` owned by `owner` can be placed on `coord`.
///
/// Stricter than [`can_enter`]: any foreign occupant blocks placement.
#[must_use]
pub fn has_room_for(
    owner: PlayerId,
    kind: UnitKind,
    coord: Coord,
    units: &BTreeMap<UnitId, Unit>,
) -> bool {
    let is_combat = kind.is_combat();
    units
        .values()
        .filter(|u| u.coord == coord)
        .all(|u| u.owner == owner && u.kind.is_combat() != is_combat)
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: Coord,
    /// g + h.
    f_score: u32,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse for lowest f first, then lowest coord.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.coord.cmp(&self.coord),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest path for `unit` to `goal`.
///
/// Returns the steps in order, excluding the start tile. Start equal to
/// goal yields an empty path.
///
/// # Errors
///
/// Returns [`GameError::Unreachable`] if the goal is off the map, cannot be
/// entered, or no sequence of legal steps reaches it.
pub fn find_path(
    unit: &Unit,
    goal: Coord,
    tiles: &TileMap,
    units: &BTreeMap<UnitId, Unit>,
) -> Result<Vec<Coord>> {
    let start = unit.coord;
    if start == goal {
        return Ok(Vec::new());
    }

    let unreachable = || GameError::Unreachable {
        from: start,
        to: goal,
    };

    let goal_tile = tiles.get(goal).ok_or_else(unreachable)?;
    if !can_enter(unit, goal_tile, units) {
        return Err(unreachable());
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut g_score: HashMap<Coord, u32> = HashMap::new();

    g_score.insert(start, 0);
    open_set.push(AStarNode {
        coord: start,
        f_score: start.distance(goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Ok(reconstruct_path(&came_from, start, goal));
        }

        let current_g = g_score.get(&current.coord).copied().unwrap_or(u32::MAX);
        // Stale heap entry superseded by a cheaper push.
        if current.f_score > current_g.saturating_add(current.coord.distance(goal)) {
            continue;
        }

        for neighbor in current.coord.neighbors() {
            let Some(tile) = tiles.get(neighbor) else {
                continue;
            };
            if !can_enter(unit, tile, units) {
                continue;
            }

            let tentative_g = current_g.saturating_add(tile.movement_cost());
            let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_score.insert(neighbor, tentative_g);
                open_set.push(AStarNode {
                    coord: neighbor,
                    f_score: tentative_g.saturating_add(neighbor.distance(goal)),
                });
            }
        }
    }

    Err(unreachable())
}

/// Walk `came_from` back from the goal, dropping the start.
fn reconstruct_path(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Total movement cost of walking `path`.
#[must_use]
pub fn path_cost(path: &[Coord], tiles: &TileMap) -> u32 {
    path.iter()
        .filter_map(|&c| tiles.get(c))
        .map(Tile::movement_cost)
        .sum()
}
