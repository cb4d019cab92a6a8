//! Five-channel yields and the per-tile yield calculation.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::map::Tile;
use crate::math::{fixed_serde, Fixed};
use crate::player::Player;
use crate::policy::ModifierSet;
use crate::terrain::Resource;

/// Food, production, gold, science and culture.
///
/// Channels are independent and purely additive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Yields {
    /// Food.
    #[serde(with = "fixed_serde")]
    pub food: Fixed,
    /// Production.
    #[serde(with = "fixed_serde")]
    pub production: Fixed,
    /// Gold.
    #[serde(with = "fixed_serde")]
    pub gold: Fixed,
    /// Science.
    #[serde(with = "fixed_serde")]
    pub science: Fixed,
    /// Culture.
    #[serde(with = "fixed_serde")]
    pub culture: Fixed,
}

impl Yields {
    /// All channels zero.
    pub const ZERO: Self = Self::ints(0, 0, 0, 0, 0);

    /// One half, for fractional table entries.
    pub const HALF: Fixed = Fixed::from_bits(1 << 31);

    /// Build from whole numbers.
    #[must_use]
    pub const fn ints(food: i32, production: i32, gold: i32, science: i32, culture: i32) -> Self {
        Self {
            food: Fixed::const_from_int(food as i64),
            production: Fixed::const_from_int(production as i64),
            gold: Fixed::const_from_int(gold as i64),
            science: Fixed::const_from_int(science as i64),
            culture: Fixed::const_from_int(culture as i64),
        }
    }

    /// Replace the food channel.
    #[must_use]
    pub const fn with_food(mut self, food: Fixed) -> Self {
        self.food = food;
        self
    }
}

impl Add for Yields {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            food: self.food + rhs.food,
            production: self.production + rhs.production,
            gold: self.gold + rhs.gold,
            science: self.science + rhs.science,
            culture: self.culture + rhs.culture,
        }
    }
}

impl AddAssign for Yields {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Yields {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Whether `player` can see `resource` on the map.
///
/// Resources with no revealing tech are visible to every player. With no
/// player nothing is, so a bare tile yield never counts its resource.
#[must_use]
pub fn is_resource_visible(resource: Resource, player: Option<&Player>) -> bool {
    player.is_some_and(|p| match resource.revealed_by() {
        None => true,
        Some(tech) => p.researched_techs.contains(&tech),
    })
}

/// Yield of `tile` as seen by `player`, including that player's modifiers.
#[must_use]
pub fn tile_yield(tile: &Tile, player: Option<&Player>) -> Yields {
    let modifiers = player.map(ModifierSet::for_player).unwrap_or_default();
    tile_yield_with(tile, player, &modifiers)
}

/// Yield of `tile` with a precomputed modifier set.
#[must_use]
pub fn tile_yield_with(tile: &Tile, player: Option<&Player>, modifiers: &ModifierSet) -> Yields {
    let mut total = tile.terrain.base_yield();

    if tile.is_hill {
        total.production += Fixed::ONE;
        total.science += Fixed::ONE;
    }
    if tile.has_river() {
        total.food += Fixed::ONE;
    }
    if let Some(resource) = tile.resource {
        if is_resource_visible(resource, player) {
            total += resource.bonus_yield();
        }
    }
    if let Some(improvement) = tile.improvement {
        total += improvement.bonus_yield();
    }
    total + modifiers.tile_bonus(tile)
}
