//! Shortest path search over a `CompactGraph` and route outputs

mod dijkstra;
mod metrics;
mod to_geojson;

use serde::{Deserialize, Serialize};

pub use dijkstra::shortest_path;
pub use metrics::RouteMetrics;
pub use to_geojson::{graph_to_geojson, route_to_geojson, to_geojson_string};

use crate::{EdgeIdx, NodeId};

/// Which precomputed weight column drives the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKind {
    Fastest,
    Safest,
}

impl WeightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Safest => "safest",
        }
    }
}

/// A path from start to goal; `edges[i]` connects `nodes[i]` to `nodes[i + 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeIdx>,
    /// Sum of the selected weight column along the path
    pub cost: f64,
}

impl RoutePath {
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoPathReason {
    UnknownStart,
    UnknownEnd,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathResult {
    Found(RoutePath),
    NoPath { reason: NoPathReason },
}

impl PathResult {
    pub fn path(&self) -> Option<&RoutePath> {
        match self {
            Self::Found(path) => Some(path),
            Self::NoPath { .. } => None,
        }
    }

    pub fn into_path(self) -> Option<RoutePath> {
        match self {
            Self::Found(path) => Some(path),
            Self::NoPath { .. } => None,
        }
    }
}
