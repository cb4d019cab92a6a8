//! # Civ Core
//!
//! Deterministic simulation core for a turn-based hex strategy game.
//!
//! This crate contains **only** game rules:
//! - No rendering
//! - No IO
//! - No unseeded randomness (every roll comes from the state's `ChaCha8Rng`)
//! - Fixed-point arithmetic for every fractional quantity
//!
//! This separation enables:
//! - Headless autoplay and batch runs
//! - Replays from a seed and an action list
//! - Determinism testing via [`state::GameState::state_hash`]
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial coordinates and distance
//! - [`map_generation`] - Procedural terrain, resources and rivers
//! - [`yields`] - Tile yields and resource visibility
//! - [`visibility`] - Fog of war and first contact
//! - [`pathfinding`] - A* with domain and stacking rules
//! - [`combat`] - Damage formulas and siege resolution
//! - [`actions`] - Copy-on-write player actions
//! - [`turn`] - The end-turn state machine
//! - [`ai`] - Heuristic mover for computer players
//!
//! ## Example
//!
//! ```
//! use civ_core::prelude::*;
//!
//! let state = start_game(&GameSettings::default().with_seed(7)).unwrap();
//! let human = state.human_id().unwrap();
//! let settler = state
//!     .units_of(human)
//!     .find(|u| u.kind.is_settler())
//!     .map(|u| u.id)
//!     .unwrap();
//!
//! let (state, result) = state.apply(Action::FoundCity { unit: settler });
//! assert!(result.is_ok());
//! assert_eq!(state.cities_of(human).count(), 1);
//!
//! let (state, _) = state.apply(Action::EndTurn);
//! assert_eq!(state.turn, 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod ai;
pub mod buildings;
pub mod city;
pub mod combat;
pub mod diplomacy;
pub mod error;
pub mod game;
pub mod hex;
pub mod map;
pub mod map_generation;
pub mod math;
pub mod pathfinding;
pub mod player;
pub mod policy;
pub mod settings;
pub mod state;
pub mod tech;
pub mod terrain;
pub mod turn;
pub mod unit;
pub mod unit_kind;
pub mod visibility;
pub mod yields;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{Action, ImprovementAction};
    pub use crate::buildings::Building;
    pub use crate::city::{City, CityId, ProductionTarget};
    pub use crate::error::{GameError, Result};
    pub use crate::game::start_game;
    pub use crate::hex::{distance, neighbors, Coord};
    pub use crate::map::{Tile, TileMap};
    pub use crate::map_generation::{generate_map, MapConfig, MapSize};
    pub use crate::math::Fixed;
    pub use crate::pathfinding::find_path;
    pub use crate::player::{Player, PlayerId, PlayerKind};
    pub use crate::policy::Policy;
    pub use crate::settings::{Difficulty, GameSettings};
    pub use crate::state::{GameMessage, GameState};
    pub use crate::tech::{Civic, Tech};
    pub use crate::terrain::{Improvement, Resource, Terrain};
    pub use crate::turn::{advance_turn, end_turn, TurnEvents};
    pub use crate::unit::{Unit, UnitId};
    pub use crate::unit_kind::UnitKind;
    pub use crate::yields::{is_resource_visible, tile_yield, Yields};
}
