//! Road classification from the open-ended OSM `highway` vocabulary.
//!
//! Every policy that depends on the kind of way (footpath membership,
//! speed estimate, pedestrian friendliness) is a lookup on [`RoadClass`],
//! so unknown tags land in one explicit fallback variant.

use serde::{Deserialize, Serialize};

/// Speed assumed for a road whose class carries no specific estimate
const DEFAULT_SPEED_MPH: u32 = 25;
/// `maxspeed` values above this are read as km/h
const KMH_THRESHOLD: u32 = 60;
const KMH_TO_MPH: f64 = 0.621_371;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Footway,
    Path,
    Pedestrian,
    Steps,
    Corridor,
    Cycleway,
    LivingStreet,
    Residential,
    Service,
    Track,
    Unclassified,
    Tertiary,
    Secondary,
    Primary,
    Trunk,
    Motorway,
    Road,
    Unknown,
}

impl RoadClass {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "footway" => Self::Footway,
            "path" => Self::Path,
            "pedestrian" => Self::Pedestrian,
            "steps" => Self::Steps,
            "corridor" => Self::Corridor,
            "cycleway" => Self::Cycleway,
            "living_street" => Self::LivingStreet,
            "residential" => Self::Residential,
            "service" => Self::Service,
            "track" => Self::Track,
            "unclassified" => Self::Unclassified,
            "tertiary" => Self::Tertiary,
            "secondary" => Self::Secondary,
            "primary" => Self::Primary,
            "trunk" => Self::Trunk,
            "motorway" => Self::Motorway,
            "road" => Self::Road,
            _ => Self::Unknown,
        }
    }

    /// Dedicated pedestrian infrastructure, separate from carriageways
    pub fn is_footpath(self) -> bool {
        matches!(
            self,
            Self::Footway
                | Self::Path
                | Self::Pedestrian
                | Self::Steps
                | Self::Corridor
                | Self::Cycleway
        )
    }

    /// 0..1, higher is friendlier to walk along
    pub fn pedestrian_friendliness(self) -> f64 {
        match self {
            Self::Footway => 1.0,
            Self::Path => 0.95,
            Self::Cycleway | Self::LivingStreet => 0.9,
            Self::Residential => 0.85,
            Self::Unclassified => 0.7,
            Self::Tertiary => 0.6,
            Self::Secondary => 0.4,
            Self::Primary => 0.2,
            Self::Trunk => 0.1,
            Self::Motorway => 0.0,
            _ => 0.5,
        }
    }
}

/// Parsed `highway` tag: class plus whether it was a `_link` ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highway {
    pub class: RoadClass,
    pub is_link: bool,
}

impl Highway {
    pub const UNKNOWN: Highway = Highway {
        class: RoadClass::Unknown,
        is_link: false,
    };

    /// Case-insensitive; for multi-valued tags (`a;b`) the first value is used
    pub fn parse(tag: &str) -> Self {
        let first = tag.split(';').next().unwrap_or_default().trim();
        let normalized = first.to_ascii_lowercase();
        match normalized.strip_suffix("_link") {
            Some(base) => Self {
                class: RoadClass::from_tag(base),
                is_link: true,
            },
            None => Self {
                class: RoadClass::from_tag(&normalized),
                is_link: false,
            },
        }
    }

    pub fn is_footpath(self) -> bool {
        self.class.is_footpath()
    }

    /// Typical posted limit for the class when no `maxspeed` tag exists
    pub fn estimated_speed_mph(self) -> u32 {
        match (self.class, self.is_link) {
            (RoadClass::Motorway, false) => 65,
            (RoadClass::Motorway | RoadClass::Trunk, true) => 45,
            (RoadClass::Trunk, false) => 55,
            (RoadClass::Primary, false) => 45,
            (RoadClass::Primary, true) => 35,
            (RoadClass::Secondary, false) => 35,
            (RoadClass::Secondary, true) => 30,
            (RoadClass::Tertiary, false) => 30,
            (RoadClass::Tertiary, true) => 25,
            (RoadClass::LivingStreet | RoadClass::Service, false) => 15,
            _ => DEFAULT_SPEED_MPH,
        }
    }

    /// Speed limit in mph from a raw `maxspeed` tag, or the class estimate
    /// when the tag is absent. A tag without digits yields `None`.
    pub fn speed_limit_mph(self, maxspeed: Option<&str>) -> Option<u32> {
        match maxspeed {
            Some(tag) => parse_maxspeed(tag),
            None => Some(self.estimated_speed_mph()),
        }
    }
}

/// Extracts the first integer of a `maxspeed` tag, converting km/h values
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_maxspeed(tag: &str) -> Option<u32> {
    let digits: String = tag
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    let speed: u32 = digits.parse().ok()?;
    if speed > KMH_THRESHOLD {
        Some((f64::from(speed) * KMH_TO_MPH) as u32)
    } else {
        Some(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_links_and_case() {
        let h = Highway::parse("Primary_Link");
        assert_eq!(h.class, RoadClass::Primary);
        assert!(h.is_link);
        assert_eq!(h.estimated_speed_mph(), 35);

        assert_eq!(Highway::parse("footway;path").class, RoadClass::Footway);
        assert_eq!(Highway::parse("bridleway").class, RoadClass::Unknown);
    }

    #[test]
    fn footpath_membership() {
        for tag in ["footway", "path", "pedestrian", "steps", "corridor", "cycleway"] {
            assert!(Highway::parse(tag).is_footpath(), "{tag}");
        }
        for tag in ["residential", "living_street", "service", "track", "primary", ""] {
            assert!(!Highway::parse(tag).is_footpath(), "{tag}");
        }
    }

    #[test]
    fn maxspeed_tags() {
        let road = Highway::parse("residential");
        assert_eq!(road.speed_limit_mph(Some("25 mph")), Some(25));
        assert_eq!(road.speed_limit_mph(Some("40")), Some(40));
        // 80 km/h
        assert_eq!(road.speed_limit_mph(Some("80")), Some(49));
        assert_eq!(road.speed_limit_mph(Some("signals")), None);
        assert_eq!(road.speed_limit_mph(None), Some(25));
        assert_eq!(Highway::parse("motorway").speed_limit_mph(None), Some(65));
        assert_eq!(Highway::UNKNOWN.speed_limit_mph(None), Some(25));
    }
}
