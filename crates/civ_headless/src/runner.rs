//! Single-game runner.
//!
//! Starts a game from [`GameSettings`], autoplays the human, ends turns
//! until the requested count, and condenses the result into a
//! [`GameSummary`] for JSON output.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use civ_core::error::GameError;
use civ_core::game::start_game;
use civ_core::player::PlayerKind;
use civ_core::settings::{ConfigError, GameSettings};
use civ_core::state::GameState;
use civ_core::turn::advance_turn;

use crate::autoplay::Autopilot;

/// Error type for headless runs.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A rule rejected an order.
    #[error("Game error: {0}")]
    Game(#[from] GameError),
    /// Settings could not be loaded or were out of range.
    #[error("Settings error: {0}")]
    Config(#[from] ConfigError),
    /// Batch configuration could not be parsed.
    #[error("Failed to parse batch config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Two runs of the same seed disagreed.
    #[error("Determinism check failed: runs diverged at turn {turn}")]
    Diverged {
        /// First turn whose hashes differ.
        turn: u32,
    },
}

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Game setup.
    pub settings: GameSettings,
    /// End turns to play.
    pub turns: u32,
    /// Autoplay the human seat. When off, the human only ends turns.
    pub autoplay: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            settings: GameSettings::default(),
            turns: 100,
            autoplay: true,
        }
    }
}

impl RunConfig {
    /// Config for `settings` with the default turn count.
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Set the number of turns.
    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = turns;
        self
    }

    /// Enable or disable autoplay.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// End-of-run numbers for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Seat.
    pub id: u32,
    /// Leader name.
    pub name: String,
    /// Human, AI or barbarian.
    pub kind: PlayerKind,
    /// Gold in the treasury.
    pub gold: f64,
    /// Science toward the current tech.
    pub science: f64,
    /// Culture toward the current civic.
    pub culture: f64,
    /// Cities owned.
    pub cities: usize,
    /// Units owned.
    pub units: usize,
    /// Techs researched.
    pub techs: usize,
    /// Civics researched.
    pub civics: usize,
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Seed the game was started from.
    pub seed: u64,
    /// Turn the game stopped on.
    pub turn: u32,
    /// One entry per seat.
    pub players: Vec<PlayerSummary>,
    /// Hash of the final state.
    pub final_state_hash: u64,
}

impl GameSummary {
    /// Summarize `state`.
    pub fn from_state(state: &GameState, seed: u64) -> Self {
        let players = state
            .players
            .iter()
            .map(|p| PlayerSummary {
                id: p.id.0,
                name: p.name.clone(),
                kind: p.kind,
                gold: p.gold.to_num(),
                science: p.science.to_num(),
                culture: p.culture.to_num(),
                cities: state.cities_of(p.id).count(),
                units: state.units_of(p.id).count(),
                techs: p.researched_techs.len(),
                civics: p.researched_civics.len(),
            })
            .collect();

        Self {
            seed,
            turn: state.turn,
            players,
            final_state_hash: state.state_hash(),
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String, RunnerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Play one game and return the final state with its summary.
pub fn run_game(config: &RunConfig) -> Result<(GameState, GameSummary), RunnerError> {
    let mut state = start_game(&config.settings)?;
    let mut autopilot = Autopilot::new(config.settings.seed);

    for _ in 0..config.turns {
        if config.autoplay {
            state = autopilot.play_turn(state);
        }
        let events = advance_turn(&mut state);
        debug!(
            turn = state.turn,
            spawned = events.spawned.len(),
            destroyed = events.destroyed.len(),
            founded = events.cities_founded.len(),
            "turn played"
        );
    }

    let summary = GameSummary::from_state(&state, config.settings.seed);
    info!(
        seed = summary.seed,
        turn = summary.turn,
        hash = summary.final_state_hash,
        "game finished"
    );
    Ok((state, summary))
}

/// Play the same config twice, comparing hashes after every turn.
///
/// Returns the shared final hash, or [`RunnerError::Diverged`] naming the
/// first turn the runs disagree on.
pub fn verify_seed(config: &RunConfig) -> Result<u64, RunnerError> {
    let mut a = start_game(&config.settings)?;
    let mut b = start_game(&config.settings)?;
    let mut pilot_a = Autopilot::new(config.settings.seed);
    let mut pilot_b = Autopilot::new(config.settings.seed);

    if a.state_hash() != b.state_hash() {
        return Err(RunnerError::Diverged { turn: a.turn });
    }

    for _ in 0..config.turns {
        if config.autoplay {
            a = pilot_a.play_turn(a);
            b = pilot_b.play_turn(b);
        }
        advance_turn(&mut a);
        advance_turn(&mut b);

        if a.state_hash() != b.state_hash() {
            return Err(RunnerError::Diverged { turn: a.turn });
        }
    }

    Ok(a.state_hash())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64, turns: u32) -> RunConfig {
        RunConfig::new(GameSettings::default().with_seed(seed)).with_turns(turns)
    }

    #[test]
    fn test_run_game_reaches_turn() {
        let (state, summary) = run_game(&config(5, 20)).unwrap();
        assert_eq!(state.turn, 21);
        assert_eq!(summary.turn, 21);
        assert_eq!(summary.players.len(), state.players.len());
        assert_eq!(summary.final_state_hash, state.state_hash());
    }

    #[test]
    fn test_autoplay_founds_a_city() {
        let (_, summary) = run_game(&config(5, 5)).unwrap();
        let human = &summary.players[0];
        assert_eq!(human.kind, PlayerKind::Human);
        assert!(human.cities >= 1);
    }

    #[test]
    fn test_without_autoplay_human_stays_put() {
        let (state, _) = run_game(&config(5, 5).with_autoplay(false)).unwrap();
        assert_eq!(state.cities_of(state.human_id().unwrap()).count(), 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = RunConfig::new(GameSettings::default().with_player_count(9));
        assert!(matches!(run_game(&bad), Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_verify_seed_passes() {
        let hash = verify_seed(&config(8, 25)).unwrap();
        let (_, summary) = run_game(&config(8, 25)).unwrap();
        assert_eq!(hash, summary.final_state_hash);
    }

    #[test]
    fn test_summary_save() {
        let (_, summary) = run_game(&config(3, 3)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");

        summary.save(&path).unwrap();
        let loaded: GameSummary = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.final_state_hash, summary.final_state_hash);
        assert_eq!(loaded.players.len(), summary.players.len());
        assert_eq!(loaded.players[0].cities, summary.players[0].cities);
    }
}
