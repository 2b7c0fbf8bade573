use serde::{Deserialize, Serialize};

use super::{ComponentWeights, ScoringConfig};
use crate::model::{Highway, LandCover, StreetEdge};

/// At least one open business lies within the proximity radius
pub const BUSINESS_NEAR_OPEN: f64 = 0.9;
/// Businesses are known for the area but none is open nearby
pub const BUSINESS_ISOLATED: f64 = 0.3;
/// No business information was available
pub const BUSINESS_UNKNOWN: f64 = 0.5;

/// Floor for the edge length when computing light density
const MIN_LENGTH_M: f64 = 1e-6;
const SPEED_RISK_FLOOR_MPH: f64 = 10.0;
const SPEED_RISK_SPAN_MPH: f64 = 35.0;
/// Sidewalk scores at or above this mark a footpath
const FOOTPATH_SIDEWALK: f64 = 0.99;

/// The five per-edge danger signals, each in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerComponents {
    /// 1 = no lights at all
    pub darkness: f64,
    /// 1 = dedicated footpath, 0 = carriageway
    pub sidewalk: f64,
    pub business: f64,
    pub land_risk: f64,
    pub speed_risk: f64,
}

impl Default for DangerComponents {
    fn default() -> Self {
        Self {
            darkness: 0.0,
            sidewalk: 0.0,
            business: BUSINESS_UNKNOWN,
            land_risk: LandCover::Unknown.risk(),
            speed_risk: 0.0,
        }
    }
}

impl DangerComponents {
    pub fn from_context(context: &EdgeContext, config: &ScoringConfig) -> Self {
        let is_footpath = context.highway.is_footpath();
        Self {
            darkness: darkness_score(context.light_count, context.length, config.density_scale),
            sidewalk: if is_footpath { 1.0 } else { 0.0 },
            business: business_score(context.open_businesses_nearby),
            land_risk: context.land_cover.risk(),
            speed_risk: speed_risk(is_footpath, context.speed_limit_mph),
        }
    }

    pub fn is_footpath(&self) -> bool {
        self.sidewalk >= FOOTPATH_SIDEWALK
    }

    /// Every component clamped into `0..=1`, NaN replaced by its neutral default
    #[must_use]
    pub fn clamped(self) -> Self {
        let neutral = Self::default();
        let fix = |value: f64, fallback: f64| {
            if value.is_nan() {
                fallback
            } else {
                value.clamp(0.0, 1.0)
            }
        };
        Self {
            darkness: fix(self.darkness, neutral.darkness),
            sidewalk: fix(self.sidewalk, neutral.sidewalk),
            business: fix(self.business, neutral.business),
            land_risk: fix(self.land_risk, neutral.land_risk),
            speed_risk: fix(self.speed_risk, neutral.speed_risk),
        }
    }

    /// Composite danger in `0..=weights.total()`
    pub fn danger(&self, weights: &ComponentWeights) -> f64 {
        weights.darkness * self.darkness
            + weights.sidewalk * (1.0 - self.sidewalk)
            + weights.business * (1.0 - self.business)
            + weights.land * self.land_risk
            + weights.speed * self.speed_risk
    }
}

/// Everything the scorer needs to know about one edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeContext {
    pub length: f64,
    pub travel_time: f64,
    pub light_count: u32,
    /// `None` when no business data covers the edge
    pub open_businesses_nearby: Option<u32>,
    pub land_cover: LandCover,
    pub highway: Highway,
    /// `None` when a speed tag exists but cannot be read
    pub speed_limit_mph: Option<u32>,
}

impl EdgeContext {
    /// Collects the raw signals stored on a street edge
    pub fn from_edge(
        edge: &StreetEdge,
        open_businesses_nearby: Option<u32>,
        config: &ScoringConfig,
    ) -> Self {
        let highway = edge.highway();
        let speed_limit_mph = highway.speed_limit_mph(edge.signals.maxspeed.as_deref());
        if speed_limit_mph.is_none() {
            log::debug!(
                "Unreadable maxspeed {:?} on edge {} -> {}",
                edge.signals.maxspeed,
                edge.source,
                edge.target
            );
        }
        Self {
            length: edge.sanitized_length(),
            travel_time: edge.sanitized_travel_time(config.walking_speed_kph),
            light_count: edge.signals.light_count,
            open_businesses_nearby,
            land_cover: LandCover::from_optional_code(edge.signals.land_cover),
            highway,
            speed_limit_mph,
        }
    }
}

pub fn darkness_score(light_count: u32, length: f64, density_scale: f64) -> f64 {
    let lights_per_meter = f64::from(light_count) / length.max(MIN_LENGTH_M);
    1.0 / (1.0 + lights_per_meter * density_scale)
}

pub fn business_score(open_businesses_nearby: Option<u32>) -> f64 {
    match open_businesses_nearby {
        None => BUSINESS_UNKNOWN,
        Some(0) => BUSINESS_ISOLATED,
        Some(_) => BUSINESS_NEAR_OPEN,
    }
}

/// 10 mph maps to 0 and 45 mph or more to 1; footpaths carry no traffic
pub fn speed_risk(is_footpath: bool, speed_limit_mph: Option<u32>) -> f64 {
    if is_footpath {
        return 0.0;
    }
    match speed_limit_mph {
        Some(mph) => ((f64::from(mph) - SPEED_RISK_FLOOR_MPH) / SPEED_RISK_SPAN_MPH).clamp(0.0, 1.0),
        None => 0.5,
    }
}

/// The two cost columns the shortest path search can run on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingWeights {
    pub fastest: f64,
    pub safest: f64,
}

impl RoutingWeights {
    pub fn compute(
        danger: f64,
        length: f64,
        travel_time: f64,
        is_footpath: bool,
        config: &ScoringConfig,
    ) -> Self {
        let penalty = config.penalty(is_footpath);
        let fastest = travel_time * penalty / (100.0 - danger + config.fastest_epsilon);
        let safest = config.safest_shape.weight(danger, length, penalty);
        // f64::min drops NaN, so both end up finite
        Self {
            fastest: fastest.min(f64::MAX),
            safest: safest.min(f64::MAX),
        }
    }

    /// Either weight hit the finite ceiling
    pub fn is_saturated(&self) -> bool {
        self.fastest == f64::MAX || self.safest == f64::MAX
    }
}

/// Full scoring result of one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEdge {
    pub components: DangerComponents,
    pub danger: f64,
    pub weights: RoutingWeights,
}

impl ScoredEdge {
    pub fn from_components(
        components: DangerComponents,
        length: f64,
        travel_time: f64,
        config: &ScoringConfig,
    ) -> Self {
        let components = components.clamped();
        let danger = components.danger(&config.weights).clamp(0.0, 100.0);
        let weights = RoutingWeights::compute(
            danger,
            length,
            travel_time,
            components.is_footpath(),
            config,
        );
        Self {
            components,
            danger,
            weights,
        }
    }
}

pub fn score_edge(context: &EdgeContext, config: &ScoringConfig) -> ScoredEdge {
    let components = DangerComponents::from_context(context, config);
    ScoredEdge::from_components(components, context.length, context.travel_time, config)
}
