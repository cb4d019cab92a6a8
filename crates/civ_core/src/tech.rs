//! Technology and civics trees.

use serde::{Deserialize, Serialize};

/// A researchable technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Tech {
    // Ancient
    Pottery,
    Mining,
    AnimalHusbandry,
    Sailing,
    Astrology,
    Writing,
    Archery,
    Masonry,
    BronzeWorking,
    Wheel,
    // Classical
    HorsebackRiding,
    Currency,
    IronWorking,
    Shipbuilding,
    Mathematics,
    Construction,
    Engineering,
    // Medieval
    Stirrups,
    Apprenticeship,
    Machinery,
    Education,
    Banking,
    Gunpowder,
    // Renaissance
    Printing,
    MetalCasting,
    Cartography,
    // Industrial
    Industrialization,
    ScientificTheory,
    SteamPower,
    Steel,
    // Modern
    ReplaceableParts,
    Combustion,
    Flight,
    Chemistry,
    // Atomic
    AdvancedFlight,
    NuclearFission,
}

impl Tech {
    /// Every tech in tree order.
    pub const ALL: [Self; 36] = [
        Self::Pottery,
        Self::Mining,
        Self::AnimalHusbandry,
        Self::Sailing,
        Self::Astrology,
        Self::Writing,
        Self::Archery,
        Self::Masonry,
        Self::BronzeWorking,
        Self::Wheel,
        Self::HorsebackRiding,
        Self::Currency,
        Self::IronWorking,
        Self::Shipbuilding,
        Self::Mathematics,
        Self::Construction,
        Self::Engineering,
        Self::Stirrups,
        Self::Apprenticeship,
        Self::Machinery,
        Self::Education,
        Self::Banking,
        Self::Gunpowder,
        Self::Printing,
        Self::MetalCasting,
        Self::Cartography,
        Self::Industrialization,
        Self::ScientificTheory,
        Self::SteamPower,
        Self::Steel,
        Self::ReplaceableParts,
        Self::Combustion,
        Self::Flight,
        Self::Chemistry,
        Self::AdvancedFlight,
        Self::NuclearFission,
    ];

    /// Science cost.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Pottery | Self::Mining | Self::AnimalHusbandry => 25,
            Self::Sailing | Self::Astrology | Self::Writing | Self::Archery => 50,
            Self::Masonry | Self::BronzeWorking => 80,
            Self::Wheel => 90,
            Self::HorsebackRiding | Self::Currency | Self::IronWorking => 120,
            Self::Shipbuilding | Self::Mathematics | Self::Construction | Self::Engineering => 200,
            Self::Stirrups | Self::Education => 360,
            Self::Apprenticeship | Self::Machinery => 300,
            Self::Banking => 450,
            Self::Gunpowder => 500,
            Self::Printing => 600,
            Self::MetalCasting | Self::Cartography => 660,
            Self::Industrialization | Self::ScientificTheory => 900,
            Self::SteamPower => 800,
            Self::Steel | Self::Chemistry => 1100,
            Self::ReplaceableParts | Self::Combustion => 1250,
            Self::Flight => 1200,
            Self::AdvancedFlight => 1500,
            Self::NuclearFission => 2000,
        }
    }

    /// Era index, 0 = ancient.
    #[must_use]
    pub const fn era(self) -> u8 {
        match self {
            Self::Pottery
            | Self::Mining
            | Self::AnimalHusbandry
            | Self::Sailing
            | Self::Astrology
            | Self::Writing
            | Self::Archery
            | Self::Masonry
            | Self::BronzeWorking
            | Self::Wheel => 0,
            Self::HorsebackRiding
            | Self::Currency
            | Self::IronWorking
            | Self::Shipbuilding
            | Self::Mathematics
            | Self::Construction
            | Self::Engineering => 1,
            Self::Stirrups
            | Self::Apprenticeship
            | Self::Machinery
            | Self::Education
            | Self::Banking
            | Self::Gunpowder => 2,
            Self::Printing | Self::MetalCasting | Self::Cartography => 3,
            Self::Industrialization | Self::ScientificTheory | Self::SteamPower | Self::Steel => 4,
            Self::ReplaceableParts | Self::Combustion | Self::Flight | Self::Chemistry => 5,
            Self::AdvancedFlight | Self::NuclearFission => 6,
        }
    }

    /// Techs that must be known before this one can be researched.
    #[must_use]
    pub const fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::Pottery
            | Self::Mining
            | Self::AnimalHusbandry
            | Self::Sailing
            | Self::Astrology => &[],
            Self::Writing => &[Self::Pottery],
            Self::Archery => &[Self::AnimalHusbandry],
            Self::Masonry | Self::BronzeWorking | Self::Wheel => &[Self::Mining],
            Self::HorsebackRiding => &[Self::AnimalHusbandry, Self::Archery],
            Self::Currency => &[Self::Writing],
            Self::IronWorking => &[Self::BronzeWorking],
            Self::Shipbuilding => &[Self::Sailing],
            Self::Mathematics => &[Self::Currency, Self::Wheel],
            Self::Construction => &[Self::Masonry, Self::Wheel],
            Self::Engineering => &[Self::Wheel],
            Self::Stirrups => &[Self::HorsebackRiding],
            Self::Apprenticeship => &[Self::Currency, Self::Mining],
            Self::Machinery => &[Self::Engineering, Self::IronWorking],
            Self::Education => &[Self::Mathematics],
            Self::Banking => &[Self::Currency, Self::Education],
            Self::Gunpowder => &[Self::Stirrups, Self::Apprenticeship],
            Self::Printing => &[Self::Education],
            Self::MetalCasting => &[Self::Gunpowder],
            Self::Cartography => &[Self::Shipbuilding, Self::Astrology],
            Self::Industrialization => &[Self::MetalCasting, Self::Banking],
            Self::ScientificTheory => &[Self::Education, Self::Printing],
            Self::SteamPower | Self::ReplaceableParts => &[Self::Industrialization],
            Self::Steel => &[Self::MetalCasting],
            Self::Combustion => &[Self::SteamPower, Self::Steel],
            Self::Flight => &[Self::ScientificTheory, Self::Combustion],
            Self::Chemistry => &[Self::ScientificTheory],
            Self::AdvancedFlight => &[Self::Flight],
            Self::NuclearFission => &[Self::Chemistry],
        }
    }
}

/// A civic on the culture tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Civic {
    CodeOfLaws,
    Craftsmanship,
    ForeignTrade,
    EarlyEmpire,
    Mysticism,
    PoliticalPhilosophy,
    DramaPoetry,
    GamesRecreation,
    DefensiveTactics,
    Feudalism,
    CivilService,
    Theology,
    Humanism,
    DiplomaticService,
    NaturalHistory,
    Ideology,
    Suffrage,
    Totalitarianism,
    ClassStruggle,
}

impl Civic {
    /// Every civic in tree order.
    pub const ALL: [Self; 19] = [
        Self::CodeOfLaws,
        Self::Craftsmanship,
        Self::ForeignTrade,
        Self::EarlyEmpire,
        Self::Mysticism,
        Self::PoliticalPhilosophy,
        Self::DramaPoetry,
        Self::GamesRecreation,
        Self::DefensiveTactics,
        Self::Feudalism,
        Self::CivilService,
        Self::Theology,
        Self::Humanism,
        Self::DiplomaticService,
        Self::NaturalHistory,
        Self::Ideology,
        Self::Suffrage,
        Self::Totalitarianism,
        Self::ClassStruggle,
    ];

    /// Culture cost.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::CodeOfLaws => 20,
            Self::Craftsmanship | Self::ForeignTrade => 40,
            Self::EarlyEmpire => 70,
            Self::Mysticism => 50,
            Self::PoliticalPhilosophy | Self::DramaPoetry | Self::GamesRecreation => 110,
            Self::DefensiveTactics => 160,
            Self::Feudalism | Self::CivilService => 275,
            Self::Theology => 120,
            Self::Humanism | Self::DiplomaticService => 540,
            Self::NaturalHistory => 870,
            Self::Ideology => 1200,
            Self::Suffrage | Self::Totalitarianism | Self::ClassStruggle => 1500,
        }
    }

    /// Civics that must be known before this one can be studied.
    #[must_use]
    pub const fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::CodeOfLaws => &[],
            Self::Craftsmanship | Self::ForeignTrade | Self::Mysticism => &[Self::CodeOfLaws],
            Self::EarlyEmpire => &[Self::ForeignTrade],
            Self::PoliticalPhilosophy => &[Self::EarlyEmpire, Self::Craftsmanship],
            Self::DramaPoetry | Self::Theology => &[Self::Mysticism],
            Self::GamesRecreation => &[Self::Craftsmanship],
            Self::DefensiveTactics => &[Self::PoliticalPhilosophy],
            Self::Feudalism => &[Self::DefensiveTactics],
            Self::CivilService => &[Self::PoliticalPhilosophy, Self::DramaPoetry],
            Self::Humanism => &[Self::DramaPoetry, Self::CivilService],
            Self::DiplomaticService => &[Self::CivilService],
            Self::NaturalHistory => &[Self::Humanism],
            Self::Ideology => &[Self::Humanism, Self::DiplomaticService],
            Self::Suffrage | Self::Totalitarianism | Self::ClassStruggle => &[Self::Ideology],
        }
    }
}
