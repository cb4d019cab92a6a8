//! Policy cards and the per-player modifier set.
//!
//! Policies are never checked by id at call sites. Instead
//! [`ModifierSet::for_player`] folds a player's active policies and
//! researched civics into lists of hook functions once, and yield, combat,
//! production and movement code asks the set.

use serde::{Deserialize, Serialize};

use crate::map::Tile;
use crate::math::Fixed;
use crate::player::Player;
use crate::tech::Civic;
use crate::terrain::Improvement;
use crate::unit_kind::{Domain, UnitKind};
use crate::yields::Yields;

/// Slot family a policy card occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyCategory {
    /// Military slots.
    Military,
    /// Economic slots.
    Economic,
    /// Diplomatic slots.
    Diplomatic,
    /// Wildcard slot.
    Wildcard,
}

impl PolicyCategory {
    /// How many cards of this category may be active at once.
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::Military | Self::Economic | Self::Diplomatic => 2,
            Self::Wildcard => 1,
        }
    }
}

/// A policy card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Policy {
    /// +1 gold per city.
    GodKing,
    /// +1 production per city.
    UrbanPlanning,
    /// +5 damage against barbarians.
    Discipline,
    /// +1 moves for scouts.
    Survey,
    /// +30% production toward builders.
    Ilkum,
    /// +50% production toward land military units.
    Agoge,
    /// Halves the cost of diplomatic gifts.
    DiplomaticLeague,
    /// +50% production toward settlers.
    Colonization,
    /// +2 gold per turn.
    Strategos,
    /// +2 science per turn.
    Inspiration,
    /// +1 gold and +1 culture per turn.
    Revelation,
    /// +2 culture per turn.
    LiteraryTradition,
    /// +1 moves for sea units.
    Navigation,
    /// +1 science and +1 culture per city.
    TradeConfederation,
    /// +50% production toward land military units.
    FeudalContract,
    /// +2 food on farms.
    Collectivization,
    /// +5 damage when attacking from home territory.
    DefenseOfMotherland,
    /// +100% production toward sea units.
    InternationalWaters,
}

impl Policy {
    /// Slot family.
    #[must_use]
    pub const fn category(self) -> PolicyCategory {
        match self {
            Self::Discipline
            | Self::Survey
            | Self::Agoge
            | Self::Navigation
            | Self::FeudalContract
            | Self::DefenseOfMotherland
            | Self::InternationalWaters => PolicyCategory::Military,
            Self::GodKing
            | Self::UrbanPlanning
            | Self::Ilkum
            | Self::Colonization
            | Self::TradeConfederation
            | Self::Collectivization => PolicyCategory::Economic,
            Self::DiplomaticLeague => PolicyCategory::Diplomatic,
            Self::Strategos | Self::Inspiration | Self::Revelation | Self::LiteraryTradition => {
                PolicyCategory::Wildcard
            }
        }
    }
}

/// Inputs a combat modifier may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CombatContext {
    /// Defender belongs to the barbarian player.
    pub defender_is_barbarian: bool,
    /// Attacker stands on a tile its owner controls.
    pub attacker_in_home_territory: bool,
}

/// Extra yield on a tile.
pub type TileModifier = fn(&Tile) -> Yields;
/// Flat bonus damage dealt by the modified side.
pub type CombatModifier = fn(&CombatContext) -> u32;
/// Percent production bonus toward a unit kind.
pub type ProductionModifier = fn(UnitKind) -> u32;
/// Extra max moves for a unit kind.
pub type MovementModifier = fn(UnitKind) -> u32;

fn farm_food(tile: &Tile) -> Yields {
    match tile.improvement {
        Some(Improvement::Farm) => Yields::ints(1, 0, 0, 0, 0),
        _ => Yields::ZERO,
    }
}

fn collective_farm_food(tile: &Tile) -> Yields {
    match tile.improvement {
        Some(Improvement::Farm) => Yields::ints(2, 0, 0, 0, 0),
        _ => Yields::ZERO,
    }
}

fn versus_barbarians(ctx: &CombatContext) -> u32 {
    if ctx.defender_is_barbarian {
        5
    } else {
        0
    }
}

fn home_territory(ctx: &CombatContext) -> u32 {
    if ctx.attacker_in_home_territory {
        5
    } else {
        0
    }
}

fn military_drill(kind: UnitKind) -> u32 {
    if kind.is_land_military() {
        50
    } else {
        0
    }
}

fn settler_drive(kind: UnitKind) -> u32 {
    if kind.is_settler() {
        50
    } else {
        0
    }
}

fn builder_drive(kind: UnitKind) -> u32 {
    if kind == UnitKind::Builder {
        30
    } else {
        0
    }
}

fn shipyards(kind: UnitKind) -> u32 {
    if kind.domain() == Domain::Sea {
        100
    } else {
        0
    }
}

fn scout_legs(kind: UnitKind) -> u32 {
    u32::from(kind.is_scout())
}

fn sea_legs(kind: UnitKind) -> u32 {
    u32::from(kind.domain() == Domain::Sea)
}

/// Modifier hooks derived from one player's policies and civics.
#[derive(Debug, Clone, Default)]
pub struct ModifierSet {
    tile: Vec<TileModifier>,
    combat: Vec<CombatModifier>,
    production: Vec<ProductionModifier>,
    movement: Vec<MovementModifier>,
    per_city: Yields,
    per_turn: Yields,
    gift_discount: bool,
}

impl ModifierSet {
    /// Fold a player's active policies and researched civics into hooks.
    #[must_use]
    pub fn for_player(player: &Player) -> Self {
        let mut set = Self::default();

        if player.researched_civics.contains(&Civic::Feudalism) {
            set.tile.push(farm_food);
        }

        for policy in &player.active_policies {
            match policy {
                Policy::GodKing => set.per_city += Yields::ints(0, 0, 1, 0, 0),
                Policy::UrbanPlanning => set.per_city += Yields::ints(0, 1, 0, 0, 0),
                Policy::TradeConfederation => set.per_city += Yields::ints(0, 0, 0, 1, 1),
                Policy::Strategos => set.per_turn += Yields::ints(0, 0, 2, 0, 0),
                Policy::Inspiration => set.per_turn += Yields::ints(0, 0, 0, 2, 0),
                Policy::Revelation => set.per_turn += Yields::ints(0, 0, 1, 0, 1),
                Policy::LiteraryTradition => set.per_turn += Yields::ints(0, 0, 0, 0, 2),
                Policy::Collectivization => set.tile.push(collective_farm_food),
                Policy::Discipline => set.combat.push(versus_barbarians),
                Policy::DefenseOfMotherland => set.combat.push(home_territory),
                Policy::Agoge | Policy::FeudalContract => set.production.push(military_drill),
                Policy::Colonization => set.production.push(settler_drive),
                Policy::Ilkum => set.production.push(builder_drive),
                Policy::InternationalWaters => set.production.push(shipyards),
                Policy::Survey => set.movement.push(scout_legs),
                Policy::Navigation => set.movement.push(sea_legs),
                Policy::DiplomaticLeague => set.gift_discount = true,
            }
        }

        set
    }

    /// Extra yield on `tile`.
    #[must_use]
    pub fn tile_bonus(&self, tile: &Tile) -> Yields {
        self.tile.iter().map(|hook| hook(tile)).sum()
    }

    /// Flat yield added once per owned city.
    #[must_use]
    pub const fn city_bonus(&self) -> Yields {
        self.per_city
    }

    /// Flat yield added to the player once per turn.
    #[must_use]
    pub const fn turn_bonus(&self) -> Yields {
        self.per_turn
    }

    /// Extra damage dealt by an attacker owned by this player.
    #[must_use]
    pub fn combat_bonus(&self, ctx: &CombatContext) -> u32 {
        self.combat.iter().map(|hook| hook(ctx)).sum()
    }

    /// Scale raw city production toward `kind` by the production hooks.
    #[must_use]
    pub fn production_toward(&self, kind: UnitKind, raw: Fixed) -> Fixed {
        let percent: u32 = self.production.iter().map(|hook| hook(kind)).sum();
        if percent == 0 {
            raw
        } else {
            raw * Fixed::from_num(100 + percent) / Fixed::from_num(100)
        }
    }

    /// Max moves for `kind` after movement hooks.
    #[must_use]
    pub fn max_moves(&self, kind: UnitKind) -> u32 {
        kind.stats().moves + self.movement.iter().map(|hook| hook(kind)).sum::<u32>()
    }

    /// Gold cost of a diplomatic gift.
    #[must_use]
    pub const fn gift_cost(&self, base: u32) -> u32 {
        if self.gift_discount {
            base / 2
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Coord;
    use crate::player::{PlayerId, PlayerKind};
    use crate::terrain::Terrain;

    fn player_with(policies: &[Policy]) -> Player {
        let mut player = Player::new(PlayerId(0), "Tester", PlayerKind::Human);
        player.active_policies.extend(policies.iter().copied());
        player
    }

    #[test]
    fn test_empty_set_is_neutral() {
        let set = ModifierSet::for_player(&player_with(&[]));
        let tile = Tile::new(Coord::new(0, 0), Terrain::Plains);
        assert_eq!(set.tile_bonus(&tile), Yields::ZERO);
        assert_eq!(set.city_bonus(), Yields::ZERO);
        assert_eq!(set.combat_bonus(&CombatContext::default()), 0);
        assert_eq!(set.max_moves(UnitKind::Scout), 3);
        assert_eq!(set.gift_cost(50), 50);
    }

    #[test]
    fn test_city_flat_bonuses_stack() {
        let set = ModifierSet::for_player(&player_with(&[
            Policy::GodKing,
            Policy::UrbanPlanning,
            Policy::TradeConfederation,
        ]));
        assert_eq!(set.city_bonus(), Yields::ints(0, 1, 1, 1, 1));
    }

    #[test]
    fn test_discipline_only_against_barbarians() {
        let set = ModifierSet::for_player(&player_with(&[Policy::Discipline]));
        let barbs = CombatContext {
            defender_is_barbarian: true,
            ..CombatContext::default()
        };
        assert_eq!(set.combat_bonus(&barbs), 5);
        assert_eq!(set.combat_bonus(&CombatContext::default()), 0);
    }

    #[test]
    fn test_production_and_movement_hooks() {
        let set = ModifierSet::for_player(&player_with(&[
            Policy::Agoge,
            Policy::Survey,
            Policy::Navigation,
        ]));
        let ten = Fixed::from_num(10);
        assert_eq!(set.production_toward(UnitKind::Warrior, ten), Fixed::from_num(15));
        assert_eq!(set.production_toward(UnitKind::Settler, ten), ten);
        assert_eq!(set.max_moves(UnitKind::Scout), 4);
        assert_eq!(set.max_moves(UnitKind::Galley), 4);
        assert_eq!(set.max_moves(UnitKind::Warrior), 2);
    }

    #[test]
    fn test_slot_limits() {
        assert_eq!(PolicyCategory::Wildcard.slots(), 1);
        assert_eq!(Policy::Strategos.category(), PolicyCategory::Wildcard);
        assert_eq!(Policy::DiplomaticLeague.category(), PolicyCategory::Diplomatic);
    }
}
