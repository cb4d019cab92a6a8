//! Autoplay for the human seat.
//!
//! Plays the human the way the computer players are played: settlers
//! found cities where the spacing rule allows, military units strike
//! adjacent enemies or wander, and cities always have something to build.
//! Every order goes through [`GameState::apply`], so an autoplayed game is
//! exactly as legal as a hand-played one.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use civ_core::actions::{Action, FOUND_CITY_MIN_DISTANCE};
use civ_core::ai::{choose_civic, choose_production, choose_research};
use civ_core::hex::Coord;
use civ_core::pathfinding::can_enter;
use civ_core::player::PlayerId;
use civ_core::state::GameState;
use civ_core::unit::{Unit, UnitId};

/// Mixed into the game seed so autoplay rolls differ from the core's.
const AUTOPLAY_SALT: u64 = 0x0A07_0B1A_F00D;

/// Seeded autoplayer for the human seat.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: ChaCha8Rng,
}

impl Autopilot {
    /// An autopilot whose rolls are derived from the game seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed ^ AUTOPLAY_SALT),
        }
    }

    /// Issue every order for the human's turn. Does not end the turn.
    pub fn play_turn(&mut self, state: GameState) -> GameState {
        let Some(human) = state.human_id() else {
            return state;
        };

        let state = pick_studies(state, human);
        let state = self.move_units(state, human);
        pick_production(state, human)
    }

    fn move_units(&mut self, mut state: GameState, human: PlayerId) -> GameState {
        let ids: Vec<UnitId> = state.units_of(human).map(|u| u.id).collect();

        for id in ids {
            let Ok(unit) = state.unit(id) else {
                continue;
            };
            if unit.moves_left == 0 {
                continue;
            }

            if unit.kind.is_settler() && !state.city_within(unit.coord, FOUND_CITY_MIN_DISTANCE) {
                state = issue(state, Action::FoundCity { unit: id });
                continue;
            }

            if unit.is_combat() {
                if let Some(defender) = adjacent_enemy(&state, unit) {
                    state = issue(state, Action::Attack { attacker: id, defender });
                    continue;
                }
            }

            if unit.kind.is_builder() {
                continue;
            }

            let options = wander_options(&state, unit);
            if let Some(&step) = options.choose(&mut self.rng) {
                trace!(unit = %id, to = %step, "autoplay wander");
                state = issue(
                    state,
                    Action::MoveAlongPath {
                        unit: id,
                        path: vec![step],
                    },
                );
            }
        }

        state
    }
}

fn issue(state: GameState, action: Action) -> GameState {
    let (next, result) = state.apply(action.clone());
    if let Err(err) = result {
        trace!(?action, %err, "autoplay order rejected");
    }
    next
}

fn adjacent_enemy(state: &GameState, unit: &Unit) -> Option<UnitId> {
    state
        .units
        .values()
        .filter(|other| other.owner != unit.owner && unit.coord.is_adjacent(other.coord))
        .find(|other| {
            other.is_combat()
                || state
                    .city_at(other.coord)
                    .map_or(true, |city| city.owner == other.owner)
        })
        .map(|other| other.id)
}

fn wander_options(state: &GameState, unit: &Unit) -> Vec<Coord> {
    unit.coord
        .neighbors()
        .into_iter()
        .filter(|&n| {
            state.tiles.get(n).is_some_and(|tile| {
                can_enter(unit, tile, &state.units)
                    && tile.movement_cost() <= unit.moves_left
                    && state.units_at(n).all(|other| other.owner == unit.owner)
                    && state.city_at(n).map_or(true, |city| city.owner == unit.owner)
            })
        })
        .collect()
}

fn pick_studies(mut state: GameState, human: PlayerId) -> GameState {
    let Ok(player) = state.player(human) else {
        return state;
    };
    let (needs_tech, needs_civic) = (player.current_tech.is_none(), player.current_civic.is_none());

    if needs_tech {
        if let Some(tech) = choose_research(&state, human) {
            state = issue(state, Action::SelectResearch { player: human, tech });
        }
    }
    if needs_civic {
        if let Some(civic) = choose_civic(&state, human) {
            state = issue(state, Action::SelectCivic { player: human, civic });
        }
    }
    state
}

fn pick_production(mut state: GameState, human: PlayerId) -> GameState {
    let idle: Vec<_> = state
        .cities_of(human)
        .filter(|city| city.production_target.is_none())
        .map(|city| city.id)
        .collect();

    for city in idle {
        if let Some(target) = choose_production(&state, city) {
            state = issue(state, Action::SetProduction { city, target });
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use civ_core::unit_kind::UnitKind;
    use civ_test_utils::fixtures::{place_city, place_unit, TestWorld, HUMAN};

    #[test]
    fn test_settler_founds_city() {
        let mut state = TestWorld::new(4).build();
        place_unit(&mut state, HUMAN, UnitKind::Settler, Coord::new(0, 0));

        let state = Autopilot::new(1).play_turn(state);
        assert!(state.city_at(Coord::new(0, 0)).is_some());
        assert!(state.units_of(HUMAN).next().is_none());
    }

    #[test]
    fn test_settler_near_city_wanders_instead() {
        let mut state = TestWorld::new(4).build();
        place_city(&mut state, HUMAN, Coord::new(0, 0));
        let settler = place_unit(&mut state, HUMAN, UnitKind::Settler, Coord::new(1, 0));

        let state = Autopilot::new(1).play_turn(state);
        assert_eq!(state.cities.len(), 1);
        assert_ne!(state.unit(settler).unwrap().coord, Coord::new(1, 0));
    }

    #[test]
    fn test_warrior_strikes_adjacent_enemy() {
        let mut state = TestWorld::new(3).with_ai("Trajan").build();
        place_unit(&mut state, HUMAN, UnitKind::Warrior, Coord::new(0, 0));
        let enemy = place_unit(&mut state, PlayerId(1), UnitKind::Warrior, Coord::new(1, 0));

        let state = Autopilot::new(1).play_turn(state);
        assert_eq!(state.unit(enemy).unwrap().health, 90);
        assert!(state.player(HUMAN).unwrap().is_at_war_with(PlayerId(1)));
    }

    #[test]
    fn test_idle_city_gets_a_target() {
        let mut state = TestWorld::new(3).build();
        let city = place_city(&mut state, HUMAN, Coord::new(0, 0));

        let state = Autopilot::new(1).play_turn(state);
        assert!(state.city(city).unwrap().production_target.is_some());
        assert!(state.player(HUMAN).unwrap().current_tech.is_some());
    }

    #[test]
    fn test_same_seed_same_orders() {
        let mut start = TestWorld::new(4).build();
        place_unit(&mut start, HUMAN, UnitKind::Scout, Coord::new(0, 0));

        let a = Autopilot::new(9).play_turn(start.clone());
        let b = Autopilot::new(9).play_turn(start);
        assert_eq!(a, b);
    }
}
