//! City buildings.
//!
//! Each building is built at most once per city and adds a flat yield to
//! that city every turn.

use serde::{Deserialize, Serialize};

use crate::tech::Tech;
use crate::yields::Yields;

/// Buildings a city can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Building {
    Monument,
    Granary,
    AncientWalls,
    Library,
    WaterMill,
    Market,
    University,
    Workshop,
    Bank,
    Factory,
    ResearchLab,
}

impl Building {
    /// Every building in table order.
    pub const ALL: [Self; 11] = [
        Self::Monument,
        Self::Granary,
        Self::AncientWalls,
        Self::Library,
        Self::WaterMill,
        Self::Market,
        Self::University,
        Self::Workshop,
        Self::Bank,
        Self::Factory,
        Self::ResearchLab,
    ];

    /// Production cost.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Monument => 42,
            Self::Granary => 46,
            Self::AncientWalls | Self::Library | Self::WaterMill => 56,
            Self::Market => 84,
            Self::University => 175,
            Self::Workshop => 120,
            Self::Bank => 200,
            Self::Factory => 265,
            Self::ResearchLab => 400,
        }
    }

    /// Flat per-turn yield added to the owning city.
    #[must_use]
    pub const fn yields(self) -> Yields {
        match self {
            Self::Monument => Yields::ints(0, 0, 0, 0, 2),
            Self::Granary => Yields::ints(2, 0, 0, 0, 0),
            Self::AncientWalls => Yields::ZERO,
            Self::Library => Yields::ints(0, 0, 0, 2, 0),
            Self::WaterMill => Yields::ints(1, 1, 0, 0, 0),
            Self::Market => Yields::ints(0, 0, 3, 0, 0),
            Self::University => Yields::ints(0, 0, 0, 4, 0),
            Self::Workshop => Yields::ints(0, 3, 0, 0, 0),
            Self::Bank => Yields::ints(0, 0, 5, 0, 0),
            Self::Factory => Yields::ints(0, 5, 0, 0, 0),
            Self::ResearchLab => Yields::ints(0, 0, 0, 8, 0),
        }
    }

    /// Extra city max health.
    #[must_use]
    pub const fn max_health_bonus(self) -> u32 {
        match self {
            Self::AncientWalls => 100,
            _ => 0,
        }
    }

    /// Tech needed before the building can be started.
    #[must_use]
    pub const fn tech(self) -> Option<Tech> {
        match self {
            Self::Monument => None,
            Self::Granary => Some(Tech::Pottery),
            Self::AncientWalls => Some(Tech::Masonry),
            Self::Library => Some(Tech::Writing),
            Self::WaterMill => Some(Tech::Wheel),
            Self::Market => Some(Tech::Currency),
            Self::University => Some(Tech::Education),
            Self::Workshop => Some(Tech::Apprenticeship),
            Self::Bank => Some(Tech::Banking),
            Self::Factory => Some(Tech::Industrialization),
            Self::ResearchLab => Some(Tech::Chemistry),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monument => "Monument",
            Self::Granary => "Granary",
            Self::AncientWalls => "Ancient Walls",
            Self::Library => "Library",
            Self::WaterMill => "Water Mill",
            Self::Market => "Market",
            Self::University => "University",
            Self::Workshop => "Workshop",
            Self::Bank => "Bank",
            Self::Factory => "Factory",
            Self::ResearchLab => "Research Lab",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_walls_add_health() {
        for building in Building::ALL {
            let expected = if building == Building::AncientWalls { 100 } else { 0 };
            assert_eq!(building.max_health_bonus(), expected);
        }
    }

    #[test]
    fn test_monument_needs_no_tech() {
        assert_eq!(Building::Monument.tech(), None);
        assert_eq!(Building::Library.tech(), Some(Tech::Writing));
        assert_eq!(Building::ResearchLab.cost(), 400);
    }
}
