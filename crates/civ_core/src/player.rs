//! Players, their treasuries and diplomatic standing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::city::ProductionTarget;
use crate::math::{fixed_serde, Fixed};
use crate::policy::Policy;
use crate::tech::{Civic, Tech};

/// Player identifier. Index 0 is always the human.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Who controls a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Driven by external input.
    Human,
    /// Driven by the heuristic mover.
    Ai,
    /// Hostile to everyone, never founds cities.
    Barbarian,
}

/// War or peace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiplomaticStatus {
    /// Units may attack each other.
    War,
    /// Attacking first declares war.
    Peace,
}

/// One player's standing toward another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiplomaticRelation {
    /// Current status.
    pub status: DiplomaticStatus,
    /// Attitude in `0..=100`.
    pub relationship: u8,
    /// Open borders agreement.
    pub is_open_borders: bool,
}

impl DiplomaticRelation {
    /// Starting relation: war with barbarians, otherwise peace; neutral attitude.
    #[must_use]
    pub const fn initial(either_barbarian: bool) -> Self {
        Self {
            status: if either_barbarian {
                DiplomaticStatus::War
            } else {
                DiplomaticStatus::Peace
            },
            relationship: 50,
            is_open_borders: false,
        }
    }
}

/// A participant in the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Identity.
    pub id: PlayerId,
    /// Leader name, also used to name cities.
    pub name: String,
    /// Controller.
    pub kind: PlayerKind,
    /// Treasury.
    #[serde(with = "fixed_serde")]
    pub gold: Fixed,
    /// Stored science toward the current tech.
    #[serde(with = "fixed_serde")]
    pub science: Fixed,
    /// Stored culture toward the current civic.
    #[serde(with = "fixed_serde")]
    pub culture: Fixed,
    /// Science gained last turn, for display.
    pub science_yield: i32,
    /// Culture gained last turn, for display.
    pub culture_yield: i32,
    /// Gold gained last turn, for display.
    pub gold_yield: i32,
    /// Tech being researched.
    pub current_tech: Option<Tech>,
    /// Civic being studied.
    pub current_civic: Option<Civic>,
    /// Known techs.
    pub researched_techs: BTreeSet<Tech>,
    /// Known civics.
    pub researched_civics: BTreeSet<Civic>,
    /// Slotted policy cards.
    pub active_policies: BTreeSet<Policy>,
    /// Standing toward every other player.
    pub diplomacy: BTreeMap<PlayerId, DiplomaticRelation>,
    /// Players this one has met. Only grows.
    pub met_players: BTreeSet<PlayerId>,
}

impl Player {
    /// A fresh player with an empty treasury.
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            gold: Fixed::ZERO,
            science: Fixed::ZERO,
            culture: Fixed::ZERO,
            science_yield: 0,
            culture_yield: 0,
            gold_yield: 0,
            current_tech: None,
            current_civic: None,
            researched_techs: BTreeSet::new(),
            researched_civics: BTreeSet::new(),
            active_policies: BTreeSet::new(),
            diplomacy: BTreeMap::new(),
            met_players: BTreeSet::new(),
        }
    }

    /// Set the starting treasury.
    #[must_use]
    pub fn with_gold(mut self, gold: i32) -> Self {
        self.gold = Fixed::from_num(gold);
        self
    }

    /// Controlled by the heuristic mover (AI or barbarian).
    #[must_use]
    pub const fn is_computer(&self) -> bool {
        !matches!(self.kind, PlayerKind::Human)
    }

    /// Barbarian player.
    #[must_use]
    pub const fn is_barbarian(&self) -> bool {
        matches!(self.kind, PlayerKind::Barbarian)
    }

    /// Whether this player is at war with `other`.
    #[must_use]
    pub fn is_at_war_with(&self, other: PlayerId) -> bool {
        self.diplomacy
            .get(&other)
            .is_some_and(|rel| rel.status == DiplomaticStatus::War)
    }

    /// Whether `tech` is known.
    #[must_use]
    pub fn knows(&self, tech: Tech) -> bool {
        self.researched_techs.contains(&tech)
    }

    /// Whether the tech gating `target` is known.
    #[must_use]
    pub fn has_unlocked(&self, target: ProductionTarget) -> bool {
        target.required_tech().map_or(true, |tech| self.knows(tech))
    }
}
