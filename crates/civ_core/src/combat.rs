//! Combat resolution.
//!
//! Pure functions from the two participants to an outcome. Applying the
//! outcome to the game state (removing the dead, moving the victor,
//! transferring ownership) lives in [`crate::actions`].

use serde::{Deserialize, Serialize};

use crate::city::City;
use crate::math::{floor_i32, ratio, Fixed};
use crate::unit::Unit;

/// Every unit engagement inflicts at least this much damage per side hit.
pub const MIN_COMBAT_DAMAGE: i32 = 10;

/// Minimum damage a siege attack deals to a city.
pub const MIN_SIEGE_DAMAGE: i32 = 5;

/// Subtracted from attacker strength when hitting a city.
pub const SIEGE_STRENGTH_OFFSET: i32 = 10;

/// How an engagement played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engagement {
    /// A non-combat defender was taken without a fight.
    Capture,
    /// The attacker fired from beyond adjacent range and took no damage.
    Ranged,
    /// Both sides traded blows.
    Melee,
}

/// Result of [`resolve_combat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Kind of engagement.
    pub engagement: Engagement,
    /// Health removed from the defender.
    pub defender_damage: i32,
    /// Health removed from the attacker.
    pub attacker_damage: i32,
}

impl CombatOutcome {
    /// Whether the defender dies from this outcome.
    #[must_use]
    pub const fn defender_dies(&self, defender: &Unit) -> bool {
        defender.health - self.defender_damage <= 0
    }

    /// Whether the attacker dies from this outcome.
    #[must_use]
    pub const fn attacker_dies(&self, attacker: &Unit) -> bool {
        attacker.health - self.attacker_damage <= 0
    }
}

fn at_least(floor: i32, value: Fixed) -> i32 {
    floor_i32(value).max(floor)
}

/// Resolve an attack of `attacker` on `defender`.
///
/// `bonus` is flat extra damage to the defender from the attacker's
/// modifiers. A melee attacker against a non-combat defender captures it.
/// A ranged attacker beyond distance 1 takes no damage. Otherwise both
/// sides take damage, never less than [`MIN_COMBAT_DAMAGE`].
///
/// ```
/// use civ_core::combat::{resolve_combat, Engagement};
/// use civ_core::hex::Coord;
/// use civ_core::player::PlayerId;
/// use civ_core::unit::{Unit, UnitId};
/// use civ_core::unit_kind::UnitKind;
///
/// let a = Unit::new(UnitId(1), PlayerId(0), UnitKind::Warrior, Coord::new(0, 0));
/// let d = Unit::new(UnitId(2), PlayerId(1), UnitKind::Warrior, Coord::new(1, 0));
/// let outcome = resolve_combat(&a, &d, 0);
/// assert_eq!(outcome.engagement, Engagement::Melee);
/// assert_eq!((outcome.defender_damage, outcome.attacker_damage), (10, 10));
/// ```
#[must_use]
pub fn resolve_combat(attacker: &Unit, defender: &Unit, bonus: u32) -> CombatOutcome {
    if !defender.is_combat() && !attacker.is_ranged() {
        return CombatOutcome {
            engagement: Engagement::Capture,
            defender_damage: 0,
            attacker_damage: 0,
        };
    }

    let a = Fixed::from_num(attacker.strength);
    let d = Fixed::from_num(defender.strength);
    let half = ratio(1, 2);
    let bonus = bonus as i32;

    if attacker.is_ranged() && attacker.coord.distance(defender.coord) > 1 {
        CombatOutcome {
            engagement: Engagement::Ranged,
            defender_damage: at_least(MIN_COMBAT_DAMAGE, a * ratio(3, 2) - d * half) + bonus,
            attacker_damage: 0,
        }
    } else {
        CombatOutcome {
            engagement: Engagement::Melee,
            defender_damage: at_least(MIN_COMBAT_DAMAGE, a - d * half) + bonus,
            attacker_damage: at_least(MIN_COMBAT_DAMAGE, d - a * half),
        }
    }
}

/// Result of [`resolve_siege`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiegeOutcome {
    /// The city holds and loses `damage` health.
    Damaged {
        /// Health removed.
        damage: i32,
    },
    /// The city falls to the attacker.
    Captured,
}

/// Resolve an attack of `attacker` on `city`.
#[must_use]
pub fn resolve_siege(attacker: &Unit, city: &City) -> SiegeOutcome {
    let damage = (attacker.strength as i32 - SIEGE_STRENGTH_OFFSET).max(MIN_SIEGE_DAMAGE);
    if city.health - damage <= 0 {
        SiegeOutcome::Captured
    } else {
        SiegeOutcome::Damaged { damage }
    }
}
