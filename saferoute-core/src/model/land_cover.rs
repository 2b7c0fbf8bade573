//! NLCD land-cover classes and their pedestrian risk tiers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCover {
    OpenWater,
    SnowIce,
    DevelopedOpen,
    DevelopedLow,
    DevelopedMedium,
    DevelopedHigh,
    Barren,
    DeciduousForest,
    EvergreenForest,
    MixedForest,
    Shrub,
    Grassland,
    Pasture,
    CultivatedCrops,
    WoodyWetlands,
    EmergentWetlands,
    Unknown,
}

impl LandCover {
    pub fn from_code(code: u16) -> Self {
        match code {
            11 => Self::OpenWater,
            12 => Self::SnowIce,
            21 => Self::DevelopedOpen,
            22 => Self::DevelopedLow,
            23 => Self::DevelopedMedium,
            24 => Self::DevelopedHigh,
            31 => Self::Barren,
            41 => Self::DeciduousForest,
            42 => Self::EvergreenForest,
            43 => Self::MixedForest,
            52 => Self::Shrub,
            71 => Self::Grassland,
            81 => Self::Pasture,
            82 => Self::CultivatedCrops,
            90 => Self::WoodyWetlands,
            95 => Self::EmergentWetlands,
            _ => Self::Unknown,
        }
    }

    pub fn from_optional_code(code: Option<u16>) -> Self {
        code.map_or(Self::Unknown, Self::from_code)
    }

    /// Forest and wetland are the most isolated, developed and water the least
    pub fn risk(self) -> f64 {
        match self {
            Self::DeciduousForest
            | Self::EvergreenForest
            | Self::MixedForest
            | Self::WoodyWetlands
            | Self::EmergentWetlands => 1.0,
            Self::DevelopedLow
            | Self::DevelopedMedium
            | Self::DevelopedHigh
            | Self::OpenWater
            | Self::SnowIce => 0.2,
            // open space, shrub, grass, agriculture, barren and unknown
            _ => 0.6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OpenWater => "Open Water",
            Self::SnowIce => "Snow/Ice",
            Self::DevelopedOpen => "Developed Open",
            Self::DevelopedLow => "Developed Low",
            Self::DevelopedMedium => "Developed Medium",
            Self::DevelopedHigh => "Developed High",
            Self::Barren => "Barren",
            Self::DeciduousForest => "Deciduous Forest",
            Self::EvergreenForest => "Evergreen Forest",
            Self::MixedForest => "Mixed Forest",
            Self::Shrub => "Shrub/Scrub",
            Self::Grassland => "Grassland",
            Self::Pasture => "Pasture/Hay",
            Self::CultivatedCrops => "Cultivated Crops",
            Self::WoodyWetlands => "Woody Wetlands",
            Self::EmergentWetlands => "Emergent Wetlands",
            Self::Unknown => "Unknown",
        }
    }
}
