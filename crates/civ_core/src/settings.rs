//! Game setup configuration.
//!
//! Settings are plain serde data. They can be built in code with the
//! `with_*` methods or loaded from RON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map_generation::MapSize;

/// Smallest legal player count (the human plus one AI).
pub const MIN_PLAYERS: u32 = 2;

/// Largest legal player count (the human plus four AIs).
pub const MAX_PLAYERS: u32 = 5;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read file.
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Parsed but out of range.
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Difficulty label. Carried for the presentation layer; the core does not
/// consume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Relaxed.
    Easy,
    /// Default.
    #[default]
    Normal,
    /// Demanding.
    Hard,
}

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Map preset.
    pub map_size: MapSize,
    /// Total civilizations, human included. Barbarians are extra.
    pub player_count: u32,
    /// Difficulty label.
    pub difficulty: Difficulty,
    /// Human leader name.
    pub player_name: String,
    /// Seed for the map and every random roll after it.
    pub seed: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            map_size: MapSize::Small,
            player_count: 3,
            difficulty: Difficulty::Normal,
            player_name: "Player".to_string(),
            seed: 12345,
        }
    }
}

impl GameSettings {
    /// Load settings from a RON file and validate them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse settings from a RON string and validate them.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let settings: Self = ron::from_str(ron)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::Invalid(format!(
                "player_count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.player_count
            )));
        }
        if self.player_name.trim().is_empty() {
            return Err(ConfigError::Invalid("player_name must not be empty".into()));
        }
        Ok(())
    }

    /// Set the map preset.
    #[must_use]
    pub fn with_map_size(mut self, map_size: MapSize) -> Self {
        self.map_size = map_size;
        self
    }

    /// Set the player count.
    #[must_use]
    pub fn with_player_count(mut self, player_count: u32) -> Self {
        self.player_count = player_count;
        self
    }

    /// Set the difficulty label.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the human leader name.
    #[must_use]
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
