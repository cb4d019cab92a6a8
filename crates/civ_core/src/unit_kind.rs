//! Closed set of unit kinds and their static stat table.
//!
//! Every unit kind has a movement domain, base moves, strength, attack
//! range, production cost and an optional tech requirement. Behavior
//! queries (`is_ranged`, `is_settler`, ...) are derived from the table so
//! call sites never match on names.
//!
//! # Example
//!
//! ```
//! use civ_core::unit_kind::{Domain, UnitKind};
//!
//! let archer = UnitKind::Archer.stats();
//! assert_eq!(archer.domain, Domain::Land);
//! assert!(UnitKind::Archer.is_ranged());
//! assert!(!UnitKind::Settler.is_combat());
//! ```

use serde::{Deserialize, Serialize};

use crate::tech::Tech;

/// Movement medium of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// Cannot enter water.
    Land,
    /// Can only enter water.
    Sea,
    /// Unconstrained by terrain.
    Air,
}

/// Static stats for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Movement medium.
    pub domain: Domain,
    /// Moves restored every turn.
    pub moves: u32,
    /// Combat strength, 0 for civilians.
    pub strength: u32,
    /// Attack range in hexes, 0 for civilians.
    pub range: u32,
    /// Production cost (purchase costs four times this in gold).
    pub cost: u32,
    /// Tech needed before the unit can be trained.
    pub tech: Option<Tech>,
    /// Improvements the unit can build before it is used up.
    pub build_charges: Option<u32>,
}

impl UnitStats {
    const fn land(moves: u32, strength: u32, range: u32, cost: u32, tech: Option<Tech>) -> Self {
        Self {
            domain: Domain::Land,
            moves,
            strength,
            range,
            cost,
            tech,
            build_charges: None,
        }
    }

    const fn on(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    const fn charges(mut self, charges: u32) -> Self {
        self.build_charges = Some(charges);
        self
    }
}

/// Every unit kind in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum UnitKind {
    Settler,
    Builder,
    Scout,
    Warrior,
    Slinger,
    Archer,
    Spearman,
    HeavyChariot,
    Swordsman,
    Horseman,
    Catapult,
    Crossbowman,
    Knight,
    Musketman,
    Cannon,
    Infantry,
    Artillery,
    Tank,
    Fighter,
    Bomber,
    Galley,
    Quadrireme,
    Caravel,
    Ironclad,
    Battleship,
    Destroyer,
    FishingBoat,
    BarbarianWarrior,
}

impl UnitKind {
    /// Every unit kind in table order.
    pub const ALL: [Self; 28] = [
        Self::Settler,
        Self::Builder,
        Self::Scout,
        Self::Warrior,
        Self::Slinger,
        Self::Archer,
        Self::Spearman,
        Self::HeavyChariot,
        Self::Swordsman,
        Self::Horseman,
        Self::Catapult,
        Self::Crossbowman,
        Self::Knight,
        Self::Musketman,
        Self::Cannon,
        Self::Infantry,
        Self::Artillery,
        Self::Tank,
        Self::Fighter,
        Self::Bomber,
        Self::Galley,
        Self::Quadrireme,
        Self::Caravel,
        Self::Ironclad,
        Self::Battleship,
        Self::Destroyer,
        Self::FishingBoat,
        Self::BarbarianWarrior,
    ];

    /// Static stats for this kind.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        use Tech as T;
        match self {
            Self::Settler => UnitStats::land(2, 0, 0, 56, None),
            Self::Builder => UnitStats::land(2, 0, 0, 35, None).charges(3),
            Self::Scout => UnitStats::land(3, 10, 1, 20, None),
            Self::Warrior => UnitStats::land(2, 20, 1, 28, None),
            Self::Slinger => UnitStats::land(2, 15, 1, 25, None),
            Self::Archer => UnitStats::land(2, 15, 2, 42, Some(T::Archery)),
            Self::Spearman => UnitStats::land(2, 25, 1, 45, Some(T::BronzeWorking)),
            Self::HeavyChariot => UnitStats::land(4, 28, 1, 45, Some(T::Wheel)),
            Self::Swordsman => UnitStats::land(2, 35, 1, 63, Some(T::IronWorking)),
            Self::Horseman => UnitStats::land(4, 36, 1, 55, Some(T::HorsebackRiding)),
            Self::Catapult => UnitStats::land(2, 25, 2, 84, Some(T::Mathematics)),
            Self::Crossbowman => UnitStats::land(2, 30, 2, 126, Some(T::Machinery)),
            Self::Knight => UnitStats::land(4, 48, 1, 140, Some(T::Stirrups)),
            Self::Musketman => UnitStats::land(2, 55, 1, 168, Some(T::Gunpowder)),
            Self::Cannon => UnitStats::land(2, 45, 2, 190, Some(T::MetalCasting)),
            Self::Infantry => UnitStats::land(2, 70, 1, 300, Some(T::ReplaceableParts)),
            Self::Artillery => UnitStats::land(2, 60, 3, 320, Some(T::Steel)),
            Self::Tank => UnitStats::land(5, 80, 1, 350, Some(T::Combustion)),
            Self::Fighter => UnitStats::land(10, 85, 4, 380, Some(T::Flight)).on(Domain::Air),
            Self::Bomber => {
                UnitStats::land(12, 85, 6, 420, Some(T::AdvancedFlight)).on(Domain::Air)
            }
            Self::Galley => UnitStats::land(3, 25, 1, 45, Some(T::Sailing)).on(Domain::Sea),
            Self::Quadrireme => {
                UnitStats::land(3, 20, 2, 84, Some(T::Shipbuilding)).on(Domain::Sea)
            }
            Self::Caravel => UnitStats::land(4, 50, 1, 160, Some(T::Cartography)).on(Domain::Sea),
            Self::Ironclad => UnitStats::land(5, 60, 1, 260, Some(T::SteamPower)).on(Domain::Sea),
            Self::Battleship => UnitStats::land(5, 70, 3, 380, Some(T::Steel)).on(Domain::Sea),
            Self::Destroyer => UnitStats::land(6, 75, 1, 350, Some(T::Combustion)).on(Domain::Sea),
            Self::FishingBoat => UnitStats::land(3, 0, 0, 28, Some(T::Sailing))
                .on(Domain::Sea)
                .charges(1),
            Self::BarbarianWarrior => UnitStats::land(2, 18, 1, 0, None),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Settler => "Settler",
            Self::Builder => "Builder",
            Self::Scout => "Scout",
            Self::Warrior => "Warrior",
            Self::Slinger => "Slinger",
            Self::Archer => "Archer",
            Self::Spearman => "Spearman",
            Self::HeavyChariot => "Heavy Chariot",
            Self::Swordsman => "Swordsman",
            Self::Horseman => "Horseman",
            Self::Catapult => "Catapult",
            Self::Crossbowman => "Crossbowman",
            Self::Knight => "Knight",
            Self::Musketman => "Musketman",
            Self::Cannon => "Cannon",
            Self::Infantry => "Infantry",
            Self::Artillery => "Artillery",
            Self::Tank => "Tank",
            Self::Fighter => "Fighter",
            Self::Bomber => "Bomber",
            Self::Galley => "Galley",
            Self::Quadrireme => "Quadrireme",
            Self::Caravel => "Caravel",
            Self::Ironclad => "Ironclad",
            Self::Battleship => "Battleship",
            Self::Destroyer => "Destroyer",
            Self::FishingBoat => "Fishing Boat",
            Self::BarbarianWarrior => "Barbarian Warrior",
        }
    }

    /// Movement domain.
    #[must_use]
    pub const fn domain(self) -> Domain {
        self.stats().domain
    }

    /// Strength above zero.
    #[must_use]
    pub const fn is_combat(self) -> bool {
        self.stats().strength > 0
    }

    /// Attack range above one.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        self.stats().range > 1
    }

    /// Can found cities.
    #[must_use]
    pub const fn is_settler(self) -> bool {
        matches!(self, Self::Settler)
    }

    /// Carries build charges.
    #[must_use]
    pub const fn is_builder(self) -> bool {
        self.stats().build_charges.is_some()
    }

    /// Extended sight.
    #[must_use]
    pub const fn is_scout(self) -> bool {
        matches!(self, Self::Scout)
    }

    /// Land combat unit that fights in melee or ranged formation.
    #[must_use]
    pub const fn is_land_military(self) -> bool {
        self.is_combat() && matches!(self.domain(), Domain::Land)
    }

    /// Whether cities can train this kind.
    #[must_use]
    pub const fn is_producible(self) -> bool {
        !matches!(self, Self::BarbarianWarrior)
    }

    /// Sight radius in hexes.
    #[must_use]
    pub const fn sight_radius(self) -> u32 {
        if self.is_scout() {
            3
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_classification() {
        assert!(!UnitKind::Settler.is_combat());
        assert!(UnitKind::Warrior.is_combat());
        assert!(UnitKind::Archer.is_ranged());
        assert!(!UnitKind::Warrior.is_ranged());
        assert!(UnitKind::Builder.is_builder());
        assert!(UnitKind::FishingBoat.is_builder());
        assert_eq!(UnitKind::Builder.stats().build_charges, Some(3));
        assert_eq!(UnitKind::Scout.sight_radius(), 3);
        assert_eq!(UnitKind::Warrior.sight_radius(), 2);
    }

    #[test]
    fn test_domains() {
        assert_eq!(UnitKind::Galley.domain(), Domain::Sea);
        assert_eq!(UnitKind::Bomber.domain(), Domain::Air);
        assert_eq!(UnitKind::Tank.domain(), Domain::Land);
        assert_eq!(UnitKind::Bomber.stats().range, 6);
    }

    #[test]
    fn test_only_barbarians_unproducible() {
        let unproducible: Vec<_> = UnitKind::ALL
            .into_iter()
            .filter(|k| !k.is_producible())
            .collect();
        assert_eq!(unproducible, vec![UnitKind::BarbarianWarrior]);
    }
}
