//! Terrain, resource and improvement tables.
//!
//! Closed enums with `const fn` accessors. Adding a variant is a compile
//! error everywhere a table is missing an entry.

use serde::{Deserialize, Serialize};

use crate::tech::Tech;
use crate::yields::Yields;

/// Movement cost at or above which a tile cannot be entered.
pub const IMPASSABLE_COST: u32 = 999;

/// Base terrain of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    /// Ocean and lakes.
    Water,
    /// Dry open land.
    Plains,
    /// Fertile open land.
    Grassland,
    /// Woodland.
    Forest,
    /// Impassable peaks.
    Mountain,
    /// Arid land.
    Desert,
    /// Polar ice.
    Snow,
    /// Cold steppe.
    Tundra,
}

impl Terrain {
    /// All terrain variants.
    pub const ALL: [Self; 8] = [
        Self::Water,
        Self::Plains,
        Self::Grassland,
        Self::Forest,
        Self::Mountain,
        Self::Desert,
        Self::Snow,
        Self::Tundra,
    ];

    /// Base yield before hills, rivers, resources and improvements.
    #[must_use]
    pub const fn base_yield(self) -> Yields {
        match self {
            Self::Water => Yields::ints(1, 0, 1, 0, 0),
            Self::Plains => Yields::ints(1, 1, 0, 0, 0),
            Self::Grassland => Yields::ints(2, 0, 0, 0, 0),
            Self::Forest => Yields::ints(1, 2, 0, 0, 0),
            Self::Mountain => Yields::ints(0, 0, 0, 1, 0),
            Self::Desert | Self::Snow => Yields::ZERO,
            Self::Tundra => Yields::ints(1, 0, 0, 0, 0),
        }
    }

    /// Movement points spent entering a tile of this terrain.
    #[must_use]
    pub const fn movement_cost(self) -> u32 {
        match self {
            Self::Forest | Self::Snow => 2,
            Self::Mountain => IMPASSABLE_COST,
            _ => 1,
        }
    }

    /// Returns true for water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }

    /// Returns true if the terrain can ever be entered.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        self.movement_cost() < IMPASSABLE_COST
    }

    /// Land suitable for a starting position or a barbarian camp.
    #[must_use]
    pub const fn is_habitable(self) -> bool {
        !matches!(self, Self::Water | Self::Mountain | Self::Snow)
    }

    /// Single character used by map dumps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Water => '~',
            Self::Plains => '.',
            Self::Grassland => ',',
            Self::Forest => 'f',
            Self::Mountain => '^',
            Self::Desert => 'd',
            Self::Snow => '*',
            Self::Tundra => 't',
        }
    }
}

/// Strategic, luxury and bonus resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    /// Strategic.
    Iron,
    /// Strategic.
    Horses,
    /// Strategic.
    Coal,
    /// Strategic.
    Oil,
    /// Strategic.
    Aluminum,
    /// Strategic.
    Uranium,
    /// Bonus.
    Wheat,
    /// Bonus.
    Rice,
    /// Bonus.
    Cattle,
    /// Luxury.
    Gold,
    /// Sea bonus.
    Fish,
    /// Sea luxury.
    Whales,
}

impl Resource {
    /// Yield added when the resource is visible to the tile's viewer.
    #[must_use]
    pub const fn bonus_yield(self) -> Yields {
        match self {
            Self::Iron => Yields::ints(0, 2, 0, 1, 0),
            Self::Horses => Yields::ints(0, 1, 1, 0, 0),
            Self::Coal => Yields::ints(0, 3, 0, 0, 0),
            Self::Oil => Yields::ints(0, 3, 3, 0, 0),
            Self::Aluminum => Yields::ints(0, 1, 0, 2, 0),
            Self::Uranium => Yields::ints(0, 2, 0, 3, 0),
            Self::Wheat | Self::Rice | Self::Fish => Yields::ints(1, 0, 0, 0, 0),
            Self::Cattle => Yields::ints(1, 1, 0, 0, 0),
            Self::Gold => Yields::ints(0, 0, 4, 0, 1),
            Self::Whales => Yields::ints(1, 0, 2, 0, 1),
        }
    }

    /// The tech that reveals this resource, if it starts hidden.
    #[must_use]
    pub const fn revealed_by(self) -> Option<Tech> {
        match self {
            Self::Horses => Some(Tech::AnimalHusbandry),
            Self::Whales => Some(Tech::Sailing),
            Self::Iron => Some(Tech::BronzeWorking),
            Self::Coal => Some(Tech::Industrialization),
            Self::Oil => Some(Tech::Combustion),
            Self::Aluminum => Some(Tech::AdvancedFlight),
            Self::Uranium => Some(Tech::NuclearFission),
            _ => None,
        }
    }

    /// Resources a mine qualifies on.
    #[must_use]
    pub const fn is_mineable(self) -> bool {
        matches!(
            self,
            Self::Iron | Self::Coal | Self::Aluminum | Self::Uranium | Self::Gold
        )
    }

    /// Resources a pasture qualifies on.
    #[must_use]
    pub const fn is_pasturable(self) -> bool {
        matches!(self, Self::Horses | Self::Cattle)
    }

    /// Sea resources fishing boats qualify on.
    #[must_use]
    pub const fn is_marine(self) -> bool {
        matches!(self, Self::Fish | Self::Whales)
    }
}

/// Tile improvements built by builder-class units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Improvement {
    /// Food.
    Farm,
    /// Production.
    Mine,
    /// Livestock.
    Pasture,
    /// Luxury crops.
    Plantation,
    /// Sea food.
    FishingBoats,
    /// Hunting.
    Camp,
    /// Petroleum.
    OilWell,
}

impl Improvement {
    /// Yield added unconditionally while the improvement stands.
    #[must_use]
    pub const fn bonus_yield(self) -> Yields {
        match self {
            Self::Farm => Yields::ints(1, 0, 0, 0, 0),
            Self::Mine => Yields::ints(0, 2, 0, 0, 0),
            Self::Pasture => Yields::ints(0, 1, 0, 0, 0).with_food(Yields::HALF),
            Self::Plantation => Yields::ints(0, 0, 2, 0, 0),
            Self::FishingBoats => Yields::ints(1, 0, 1, 0, 0),
            Self::Camp => Yields::ints(0, 1, 1, 0, 0),
            Self::OilWell => Yields::ints(0, 3, 0, 0, 0),
        }
    }
}
