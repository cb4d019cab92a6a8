//! Cities: growth, culture and production bookkeeping.
//!
//! The arithmetic that only touches one city lives here. Anything that
//! needs the map or other entities (spawning, border claims) lives in the
//! turn processor.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buildings::Building;
use crate::hex::Coord;
use crate::math::{fixed_serde, ratio, Fixed};
use crate::player::PlayerId;
use crate::tech::Tech;
use crate::unit_kind::UnitKind;

/// Health of a newly founded city.
pub const CITY_MAX_HEALTH: i32 = 200;
/// Health of a city right after it changes hands.
pub const CAPTURED_CITY_HEALTH: i32 = 50;
/// Health restored each turn.
pub const CITY_HEAL_PER_TURN: i32 = 5;
/// Stored food never drops below this.
pub const FOOD_FLOOR: i32 = -20;
/// Culture needed for the first border growth.
pub const INITIAL_CULTURE_THRESHOLD: i32 = 50;
/// Max distance of a worked tile from the city center.
pub const WORK_RADIUS: u32 = 3;

/// City identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// What a city is producing or buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionTarget {
    /// Train a unit.
    Unit(UnitKind),
    /// Construct a building.
    Building(Building),
}

impl ProductionTarget {
    /// Production cost.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Unit(kind) => kind.stats().cost,
            Self::Building(building) => building.cost(),
        }
    }

    /// Tech that unlocks this target, if any.
    #[must_use]
    pub const fn required_tech(self) -> Option<Tech> {
        match self {
            Self::Unit(kind) => kind.stats().tech,
            Self::Building(building) => building.tech(),
        }
    }

    /// Gold cost when purchased outright.
    #[must_use]
    pub const fn purchase_cost(self) -> u32 {
        self.cost() * 4
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unit(kind) => kind.name(),
            Self::Building(building) => building.name(),
        }
    }
}

/// Outcome of applying one turn of food to a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthChange {
    /// Population unchanged.
    Steady,
    /// Population went up by one.
    Grew,
    /// Population went down by one.
    Starved,
}

/// Food needed to grow from `population` to `population + 1`.
///
/// `floor(10 + 4p + p^1.2)`.
#[must_use]
pub fn growth_threshold(population: u32) -> i32 {
    let p = f64::from(population);
    (10.0 + 4.0 * p + p.powf(1.2)).floor() as i32
}

/// A city.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    /// Identity, stable across capture.
    pub id: CityId,
    /// Owning player.
    pub owner: PlayerId,
    /// Display name.
    pub name: String,
    /// Center tile.
    pub coord: Coord,
    /// Current health.
    pub health: i32,
    /// Max health, raised by walls.
    pub max_health: i32,
    /// Accumulated production toward the current target.
    #[serde(with = "fixed_serde")]
    pub production: Fixed,
    /// Stored food surplus, may be negative down to [`FOOD_FLOOR`].
    #[serde(with = "fixed_serde")]
    pub food: Fixed,
    /// Citizens, at least one.
    pub population: u32,
    /// Item being produced.
    pub production_target: Option<ProductionTarget>,
    /// Tiles worked by citizens, oldest first. Never longer than `population`.
    pub worked_tiles: Vec<Coord>,
    /// Constructed buildings.
    pub buildings: BTreeSet<Building>,
    /// Culture toward the next border growth.
    #[serde(with = "fixed_serde")]
    pub culture_stored: Fixed,
    /// Culture needed for the next border growth.
    #[serde(with = "fixed_serde")]
    pub culture_threshold: Fixed,
}

impl City {
    /// A freshly founded city.
    pub fn new(id: CityId, owner: PlayerId, name: impl Into<String>, coord: Coord) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            coord,
            health: CITY_MAX_HEALTH,
            max_health: CITY_MAX_HEALTH,
            production: Fixed::ZERO,
            food: Fixed::ZERO,
            population: 1,
            production_target: Some(ProductionTarget::Unit(UnitKind::Warrior)),
            worked_tiles: Vec::new(),
            buildings: BTreeSet::new(),
            culture_stored: Fixed::ZERO,
            culture_threshold: Fixed::from_num(INITIAL_CULTURE_THRESHOLD),
        }
    }

    /// Restore [`CITY_HEAL_PER_TURN`] health, capped at max.
    pub fn heal(&mut self) {
        self.health = (self.health + CITY_HEAL_PER_TURN).min(self.max_health);
    }

    /// Add a building and its health bonus. Returns `false` if already built.
    pub fn add_building(&mut self, building: Building) -> bool {
        if !self.buildings.insert(building) {
            return false;
        }
        self.max_health += building.max_health_bonus() as i32;
        true
    }

    /// Food eaten per turn.
    #[must_use]
    pub fn food_consumption(&self) -> Fixed {
        Fixed::from_num(self.population * 2)
    }

    /// Apply one turn's food surplus (may be negative).
    pub fn apply_food(&mut self, surplus: Fixed) -> GrowthChange {
        self.food += surplus;

        let threshold = Fixed::from_num(growth_threshold(self.population));
        let floor = Fixed::from_num(FOOD_FLOOR);

        if self.food >= threshold {
            self.population += 1;
            self.food -= threshold;
            GrowthChange::Grew
        } else if self.food < floor {
            if self.population > 1 {
                self.population -= 1;
                self.food = Fixed::ZERO;
                self.trim_worked_tiles();
                GrowthChange::Starved
            } else {
                self.food = floor;
                GrowthChange::Steady
            }
        } else {
            GrowthChange::Steady
        }
    }

    /// Add `1 + 0.3 * population` culture. Returns true when the threshold
    /// was reached, after which the store resets and the threshold grows 20%.
    pub fn accumulate_culture(&mut self) -> bool {
        self.culture_stored += Fixed::ONE + ratio(3, 10) * Fixed::from_num(self.population);
        if self.culture_stored >= self.culture_threshold {
            self.culture_stored = Fixed::ZERO;
            self.culture_threshold *= ratio(12, 10);
            true
        } else {
            false
        }
    }

    /// Drop the most recently assigned worked tiles beyond the population.
    pub fn trim_worked_tiles(&mut self) {
        self.worked_tiles.truncate(self.population as usize);
    }

    /// Whether the production counter covers the current target.
    #[must_use]
    pub fn production_ready(&self) -> Option<ProductionTarget> {
        self.production_target
            .filter(|target| self.production >= Fixed::from_num(target.cost()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> City {
        City::new(CityId(1), PlayerId(0), "Testopolis", Coord::new(0, 0))
    }

    #[test]
    fn test_growth_threshold_values() {
        assert_eq!(growth_threshold(1), 15);
        assert_eq!(growth_threshold(2), 20);
        assert_eq!(growth_threshold(5), 36);
    }

    #[test]
    fn test_growth_resets_food() {
        let mut c = city();
        c.food = Fixed::from_num(growth_threshold(1) - 1);
        assert_eq!(c.apply_food(Fixed::ONE), GrowthChange::Grew);
        assert_eq!(c.population, 2);
        assert_eq!(c.food, Fixed::ZERO);
    }

    #[test]
    fn test_starvation_floor_at_population_one() {
        let mut c = city();
        c.food = Fixed::from_num(-19);
        assert_eq!(c.apply_food(Fixed::from_num(-5)), GrowthChange::Steady);
        assert_eq!(c.population, 1);
        assert_eq!(c.food, Fixed::from_num(FOOD_FLOOR));
    }

    #[test]
    fn test_starvation_drops_population_and_worked_tiles() {
        let mut c = city();
        c.population = 2;
        c.worked_tiles = vec![Coord::new(1, 0), Coord::new(0, 1)];
        c.food = Fixed::from_num(-20);
        assert_eq!(c.apply_food(Fixed::from_num(-1)), GrowthChange::Starved);
        assert_eq!(c.population, 1);
        assert_eq!(c.food, Fixed::ZERO);
        assert_eq!(c.worked_tiles, vec![Coord::new(1, 0)]);
    }

    #[test]
    fn test_culture_threshold_grows() {
        let mut c = city();
        c.culture_stored = Fixed::from_num(49);
        assert!(c.accumulate_culture());
        assert_eq!(c.culture_stored, Fixed::ZERO);
        assert_eq!(c.culture_threshold, Fixed::from_num(50) * ratio(12, 10));
        assert!(!c.accumulate_culture());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut c = city();
        c.health = 198;
        c.heal();
        assert_eq!(c.health, CITY_MAX_HEALTH);
    }

    #[test]
    fn test_walls_once() {
        let mut c = city();
        assert!(c.add_building(Building::AncientWalls));
        assert!(!c.add_building(Building::AncientWalls));
        assert_eq!(c.max_health, 300);
    }

    #[test]
    fn test_purchase_cost() {
        assert_eq!(ProductionTarget::Unit(UnitKind::Warrior).purchase_cost(), 112);
        assert_eq!(ProductionTarget::Building(Building::Monument).purchase_cost(), 168);
    }
}
