//! Street network components - nodes, edges and their raw signals

use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::NodeId;
use crate::model::Highway;
use crate::scoring::DangerComponents;

/// Street graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: NodeId,
    /// Node coordinates (x = lon, y = lat)
    pub geometry: Point<f64>,
}

impl StreetNode {
    pub fn new(id: NodeId, lon: f64, lat: f64) -> Self {
        Self {
            id,
            geometry: Point::new(lon, lat),
        }
    }
}

/// Raw per-edge signals gathered by the fetch collaborators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSignals {
    /// Streetlights within the attribution distance of the segment
    pub light_count: u32,
    /// Raw `maxspeed` tag ("25 mph", "40", ...)
    pub maxspeed: Option<String>,
    /// NLCD land-cover class sampled at the segment midpoint
    pub land_cover: Option<u16>,
}

/// Directed street graph edge (one per direction present in the source)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Disambiguates parallel edges between the same ordered node pair
    #[serde(default)]
    pub key: u32,
    /// Segment length in meters
    #[serde(default)]
    pub length: f64,
    /// Walking time in seconds, derived from length when absent
    #[serde(default)]
    pub travel_time: Option<f64>,
    /// OSM `highway` tag; multi-valued tags are `;`-separated
    #[serde(default)]
    pub highway: Option<String>,
    /// Optional polyline for display, falls back to a straight segment
    #[serde(default)]
    pub geometry: Option<LineString<f64>>,
    #[serde(default)]
    pub signals: EdgeSignals,
    /// Written by the scoring pass; `None` means neutral defaults
    #[serde(default)]
    pub components: Option<DangerComponents>,
    /// Open businesses near the midpoint found by the scoring pass
    #[serde(default)]
    pub business_count: u32,
}

impl StreetEdge {
    pub fn new(source: NodeId, target: NodeId, length: f64) -> Self {
        Self {
            source,
            target,
            key: 0,
            length,
            travel_time: None,
            highway: None,
            geometry: None,
            signals: EdgeSignals::default(),
            components: None,
            business_count: 0,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }

    #[must_use]
    pub fn with_highway(mut self, highway: &str) -> Self {
        self.highway = Some(highway.to_string());
        self
    }

    #[must_use]
    pub fn with_travel_time(mut self, seconds: f64) -> Self {
        self.travel_time = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: LineString<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    #[must_use]
    pub fn with_signals(mut self, signals: EdgeSignals) -> Self {
        self.signals = signals;
        self
    }

    #[must_use]
    pub fn with_components(mut self, components: DangerComponents) -> Self {
        self.components = Some(components);
        self
    }

    /// Parsed road classification of the edge
    pub fn highway(&self) -> Highway {
        self.highway
            .as_deref()
            .map_or(Highway::UNKNOWN, Highway::parse)
    }

    /// Length with negative or non-finite values replaced by zero
    pub(crate) fn sanitized_length(&self) -> f64 {
        sanitize(self.length)
    }

    /// Travel time, falling back to `length / walking speed`
    pub(crate) fn sanitized_travel_time(&self, walking_speed_kph: f64) -> f64 {
        match self.travel_time {
            Some(seconds) => sanitize(seconds),
            None if walking_speed_kph > 0.0 => {
                self.sanitized_length() / 1000.0 / walking_speed_kph * 3600.0
            }
            None => 0.0,
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_time_falls_back_to_walking_speed() {
        let edge = StreetEdge::new(1, 2, 500.0);
        // 500 m at 5 km/h is six minutes
        assert!((edge.sanitized_travel_time(5.0) - 360.0).abs() < 1e-9);

        let edge = edge.with_travel_time(42.0);
        assert_eq!(edge.sanitized_travel_time(5.0), 42.0);
    }

    #[test]
    fn broken_lengths_are_zeroed() {
        assert_eq!(StreetEdge::new(1, 2, -3.0).sanitized_length(), 0.0);
        assert_eq!(StreetEdge::new(1, 2, f64::NAN).sanitized_length(), 0.0);
        assert_eq!(
            StreetEdge::new(1, 2, 10.0)
                .with_travel_time(f64::INFINITY)
                .sanitized_travel_time(5.0),
            0.0
        );
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let edge: StreetEdge =
            serde_json::from_str(r#"{"source": 1, "target": 2, "length": 12.5}"#).unwrap();
        assert_eq!(edge.key, 0);
        assert_eq!(edge.signals, EdgeSignals::default());
        assert!(edge.components.is_none());
        assert_eq!(edge.highway(), Highway::UNKNOWN);
    }
}
