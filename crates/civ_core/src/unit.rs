//! Units on the map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::Coord;
use crate::player::PlayerId;
use crate::unit_kind::{Domain, UnitKind};

/// Full health of a unit.
pub const MAX_UNIT_HEALTH: i32 = 100;

/// Unit identifier, unique for the whole game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A unit.
///
/// Strength and range start from the kind's table entry but are stored per
/// unit, so barbarians can scale with the turn counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Identity.
    pub id: UnitId,
    /// Owning player. Capture changes this in place.
    pub owner: PlayerId,
    /// Kind.
    pub kind: UnitKind,
    /// Position.
    pub coord: Coord,
    /// Health in `0..=100`. Units at or below zero are removed.
    pub health: i32,
    /// Moves left this turn.
    pub moves_left: u32,
    /// Moves restored each turn.
    pub max_moves: u32,
    /// Combat strength.
    pub strength: u32,
    /// Attack range.
    pub range: u32,
    /// Remaining improvements, builder-class units only.
    pub build_charges: Option<u32>,
    /// Fortified flag.
    pub is_fortified: bool,
}

impl Unit {
    /// A full-health unit with stats from its kind's table entry.
    #[must_use]
    pub const fn new(id: UnitId, owner: PlayerId, kind: UnitKind, coord: Coord) -> Self {
        let stats = kind.stats();
        Self {
            id,
            owner,
            kind,
            coord,
            health: MAX_UNIT_HEALTH,
            moves_left: stats.moves,
            max_moves: stats.moves,
            strength: stats.strength,
            range: stats.range,
            build_charges: stats.build_charges,
            is_fortified: false,
        }
    }

    /// Override strength.
    #[must_use]
    pub const fn with_strength(mut self, strength: u32) -> Self {
        self.strength = strength;
        self
    }

    /// Override moves left.
    #[must_use]
    pub const fn with_moves(mut self, moves: u32) -> Self {
        self.moves_left = moves;
        self
    }

    /// Movement domain.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.kind.domain()
    }

    /// Has non-zero strength.
    #[must_use]
    pub const fn is_combat(&self) -> bool {
        self.strength > 0
    }

    /// Attacks from beyond adjacent tiles.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.range > 1
    }

    /// Health at or below zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }
}
