//! Batch game runner.
//!
//! Runs many seeds in parallel using rayon and aggregates the end-of-game
//! numbers so rule changes can be judged across a spread of maps.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use civ_core::player::PlayerKind;
use civ_core::settings::GameSettings;

use crate::runner::{run_game, GameSummary, RunConfig, RunnerError};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Settings shared by every game; the seed is replaced per game.
    pub settings: GameSettings,
    /// Number of games to run
    pub game_count: u32,
    /// Turns per game
    pub turns: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Starting seed; game `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Output file for results
    pub output: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            settings: GameSettings::default(),
            game_count: 100,
            turns: 100,
            parallel_games: 0,
            seed_start: 0,
            output: PathBuf::from("results/batch.json"),
        }
    }
}

impl BatchConfig {
    /// Create config for `game_count` games of `turns` turns
    pub fn new(game_count: u32, turns: u32) -> Self {
        Self {
            game_count,
            turns,
            ..Default::default()
        }
    }

    /// Load a batch config from a RON file
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&contents)?;
        config.settings.validate()?;
        Ok(config)
    }

    /// Set shared settings
    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set output file
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the parallelism cap
    pub fn with_parallel(mut self, parallel_games: u32) -> Self {
        self.parallel_games = parallel_games;
        self
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Aggregate numbers across all finished games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games that finished.
    pub total_games: u32,
    /// Mean cities held by the human.
    pub avg_human_cities: f64,
    /// Mean cities held per AI.
    pub avg_ai_cities: f64,
    /// Mean techs researched by the human.
    pub avg_human_techs: f64,
    /// Mean techs researched per AI.
    pub avg_ai_techs: f64,
    /// Mean barbarian units alive at the end.
    pub avg_barbarian_units: f64,
    /// Games where the human ended with no cities.
    pub human_eliminated: u32,
}

impl BatchSummary {
    /// Aggregate `games`.
    pub fn from_games(games: &[GameSummary]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut human_cities = 0usize;
        let mut human_techs = 0usize;
        let mut ai_cities = 0usize;
        let mut ai_techs = 0usize;
        let mut ai_seats = 0usize;
        let mut barbarian_units = 0usize;
        let mut human_eliminated = 0;

        for game in games {
            for player in &game.players {
                match player.kind {
                    PlayerKind::Human => {
                        human_cities += player.cities;
                        human_techs += player.techs;
                        if player.cities == 0 {
                            human_eliminated += 1;
                        }
                    }
                    PlayerKind::Ai => {
                        ai_cities += player.cities;
                        ai_techs += player.techs;
                        ai_seats += 1;
                    }
                    PlayerKind::Barbarian => barbarian_units += player.units,
                }
            }
        }

        let n = games.len() as f64;
        let seats = ai_seats.max(1) as f64;
        Self {
            total_games: games.len() as u32,
            avg_human_cities: human_cities as f64 / n,
            avg_ai_cities: ai_cities as f64 / seats,
            avg_human_techs: human_techs as f64 / n,
            avg_ai_techs: ai_techs as f64 / seats,
            avg_barbarian_units: barbarian_units as f64 / n,
            human_eliminated,
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game summaries, in seed order
    pub games: Vec<GameSummary>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        turns = config.turns,
        seed_start = config.seed_start,
        "starting batch run"
    );

    let play = |i: u32| -> Result<GameSummary, BatchError> {
        let seed = config.seed_start.wrapping_add(u64::from(i));
        let run = RunConfig::new(config.settings.clone().with_seed(seed)).with_turns(config.turns);

        match run_game(&run) {
            Ok((_, summary)) => {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    debug!("Progress: {}/{}", done, config.game_count);
                }
                Ok(summary)
            }
            Err(e) => {
                warn!("Game {} failed: {}", i, e);
                Err(BatchError {
                    game_index: i,
                    seed,
                    message: e.to_string(),
                })
            }
        }
    };

    let results: Vec<Result<GameSummary, BatchError>> = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(|| (0..config.game_count).into_par_iter().map(play).collect::<Vec<_>>()),
            Err(e) => {
                warn!("Failed to build thread pool: {}, using the global pool", e);
                (0..config.game_count).into_par_iter().map(play).collect::<Vec<_>>()
            }
        }
    } else {
        (0..config.game_count).into_par_iter().map(play).collect::<Vec<_>>()
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameSummary> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.game_count, 100);
        assert_eq!(config.parallel_games, 0);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500, 40)
            .with_output(PathBuf::from("/tmp/results.json"))
            .with_seed(12345)
            .with_parallel(2);

        assert_eq!(config.game_count, 500);
        assert_eq!(config.turns, 40);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.parallel_games, 2);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new(6, 10).with_seed(100));

        assert_eq!(results.games.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (100..106).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let a = run_batch(BatchConfig::new(4, 15).with_parallel(2));
        let b = run_batch(BatchConfig::new(4, 15));
        let hashes = |r: &BatchResults| r.games.iter().map(|g| g.final_state_hash).collect::<Vec<_>>();
        assert_eq!(hashes(&a), hashes(&b));
    }

    #[test]
    fn test_invalid_settings_become_errors() {
        let config = BatchConfig::new(2, 5).with_settings(GameSettings::default().with_player_count(0));
        let results = run_batch(config);
        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 2);
        assert_eq!(results.summary, BatchSummary::default());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(BatchConfig::new(3, 5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games.len(), 3);
        assert_eq!(loaded.config.game_count, 3);
    }

    #[test]
    fn test_load_ron_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.ron");
        std::fs::write(
            &path,
            "(game_count: 12, turns: 30, settings: (player_count: 4, seed: 9))",
        )
        .unwrap();

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.game_count, 12);
        assert_eq!(config.settings.player_count, 4);
        assert_eq!(config.parallel_games, 0);
    }
}
