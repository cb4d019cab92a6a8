//! Error types for the game simulation.
//!
//! Every failure in the core is recoverable. Operations return a
//! [`Result`] and leave the caller's state untouched on `Err`.

use thiserror::Error;

use crate::city::CityId;
use crate::hex::Coord;
use crate::player::PlayerId;
use crate::unit::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The requested action is not legal in the current state.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A finished unit or purchase has no legal tile to spawn on.
    #[error("No capacity: {0}")]
    NoCapacity(String),

    /// Pathfinding found no route.
    #[error("No path from {from} to {to}")]
    Unreachable {
        /// Start coordinate.
        from: Coord,
        /// Goal coordinate.
        to: Coord,
    },

    /// Unit id does not exist.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// City id does not exist.
    #[error("City not found: {0}")]
    CityNotFound(CityId),

    /// Player id does not exist.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Invalid game state (snapshot encoding or decoding).
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Shorthand for [`GameError::InvalidAction`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidAction(message.into())
    }
}
