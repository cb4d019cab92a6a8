//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A game must replay exactly from its seed. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: fractional quantities use fixed-point
//!   arithmetic via [`civ_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Units, cities and tiles are iterated in id or insertion order.
//!
//! - **System randomness**: every roll comes from the `ChaCha8Rng` inside
//!   the game state, seeded from the settings.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (combat, growth, pathing)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full games are reproducible turn by turn
//! 4. **Parallel tests**: running N games on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use civ_core::game::start_game;
use civ_core::settings::GameSettings;
use civ_core::state::GameState;
use civ_core::turn::advance_turn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns simulated.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `turns` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one turn
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Start a game from `settings`.
///
/// # Panics
///
/// Panics if the settings are invalid.
#[must_use]
pub fn new_game(settings: &GameSettings) -> GameState {
    start_game(settings).expect("test settings must be valid")
}

/// Play the same settings twice for `turns` end turns and compare hashes.
#[must_use]
pub fn verify_game_determinism(settings: &GameSettings, turns: u32) -> DeterminismResult {
    verify_determinism(
        2,
        turns,
        || new_game(settings),
        |state| {
            advance_turn(state);
        },
        GameState::state_hash,
    )
}

/// Play `num_games` copies of the same game on scoped threads.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
#[must_use]
pub fn run_parallel_games(settings: &GameSettings, num_games: usize, turns: u32) -> Vec<u64> {
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| {
                s.spawn(|| {
                    let mut state = new_game(settings);
                    for _ in 0..turns {
                        advance_turn(&mut state);
                    }
                    state.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

/// Compare two runs turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(turn)` for the first turn at which
/// their hashes differ. Turn 0 is the opening state.
#[must_use]
pub fn find_first_divergence(settings: &GameSettings, turns: u32) -> Option<u32> {
    let mut a = new_game(settings);
    let mut b = new_game(settings);

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        advance_turn(&mut a);
        advance_turn(&mut b);

        if a.state_hash() != b.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Verify that a snapshot taken mid-game resumes identically.
///
/// Plays `turns`, snapshots, then plays `turns` more on both the live
/// state and the restored one.
#[must_use]
pub fn verify_snapshot_determinism(settings: &GameSettings, turns: u32) -> bool {
    let mut live = new_game(settings);
    for _ in 0..turns {
        advance_turn(&mut live);
    }

    let Ok(bytes) = live.serialize() else {
        return false;
    };
    let Ok(mut restored) = GameState::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != live.state_hash() {
        return false;
    }

    for _ in 0..turns {
        advance_turn(&mut live);
        advance_turn(&mut restored);
    }
    live == restored
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use civ_core::map_generation::MapSize;

    fn settings(seed: u64) -> GameSettings {
        GameSettings::default().with_seed(seed).with_player_count(4)
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, compute_hash);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_detects_divergence() {
        use std::sync::atomic::{AtomicU64, Ordering};
        let counter = AtomicU64::new(0);
        let result = verify_determinism(
            2,
            1,
            || counter.fetch_add(1, Ordering::SeqCst),
            |_| {},
            compute_hash,
        );
        assert!(!result.is_deterministic);
    }

    #[test]
    fn test_game_determinism() {
        verify_game_determinism(&settings(11), 30).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(&settings(12), 25), None);
    }

    #[test]
    fn test_parallel_games_match() {
        let hashes = run_parallel_games(&settings(13).with_map_size(MapSize::Medium), 4, 15);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_snapshot_resumes() {
        assert!(verify_snapshot_determinism(&settings(14), 12));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = new_game(&settings(1));
        let b = new_game(&settings(2));
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
