//! Whole-game determinism tests.
//!
//! Same seed, same actions, same hash: every turn, on every thread, and
//! across a save and reload.

use civ_core::actions::Action;
use civ_core::map_generation::MapSize;
use civ_core::settings::GameSettings;
use civ_core::state::GameState;
use civ_core::turn::advance_turn;
use civ_test_utils::determinism::{
    find_first_divergence, new_game, run_parallel_games, verify_game_determinism,
    verify_snapshot_determinism,
};

fn settings() -> GameSettings {
    GameSettings::default()
        .with_seed(2024)
        .with_player_count(5)
        .with_map_size(MapSize::Medium)
}

#[test]
fn test_long_game_is_deterministic() {
    verify_game_determinism(&settings(), 60).assert_deterministic();
}

#[test]
fn test_no_divergence_turn_by_turn() {
    assert_eq!(find_first_divergence(&settings(), 40), None);
}

#[test]
fn test_threads_agree() {
    let hashes = run_parallel_games(&settings(), 4, 30);
    assert_eq!(hashes.len(), 4);
    assert!(hashes.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_snapshot_mid_game() {
    assert!(verify_snapshot_determinism(&settings(), 20));
}

#[test]
fn test_replayed_actions_match() {
    let play = || {
        let mut state = new_game(&settings());
        let settler = state
            .units_of(civ_core::player::PlayerId(0))
            .find(|u| u.kind.is_settler())
            .map(|u| u.id)
            .expect("the human starts with a settler");
        let (next, result) = state.apply(Action::FoundCity { unit: settler });
        result.expect("the start tile is legal");
        state = next;
        for _ in 0..25 {
            let (next, result) = state.apply(Action::EndTurn);
            result.expect("ending the turn always succeeds");
            state = next;
        }
        state
    };

    let a = play();
    let b = play();
    assert_eq!(a.state_hash(), b.state_hash());
    assert_eq!(a, b);
}

#[test]
fn test_end_turn_action_matches_advance_turn() {
    let start = new_game(&settings());

    let mut direct = start.clone();
    advance_turn(&mut direct);
    let (via_action, result) = start.apply(Action::EndTurn);
    result.unwrap();

    assert_eq!(direct, via_action);
}

#[test]
fn test_snapshot_roundtrip_preserves_everything() {
    let mut state = new_game(&settings());
    for _ in 0..10 {
        advance_turn(&mut state);
    }
    let bytes = state.serialize().unwrap();
    let restored = GameState::deserialize(&bytes).unwrap();
    assert_eq!(restored, state);
}
