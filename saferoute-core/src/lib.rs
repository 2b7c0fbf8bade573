//! Pedestrian safety routing core.
//!
//! Scores street segments for danger from lighting, footpath, business,
//! land-cover and road-speed signals, packs the scored network into a
//! CSR adjacency (`CompactGraph`) and answers fastest/safest shortest-path
//! queries over it. Time-of-day rescoring updates the business-dependent
//! columns in place without touching topology.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod rescoring;
pub mod routing;
pub mod scoring;
pub mod shared;

pub use error::Error;
pub use loading::{NodeLocator, build_compact_graph};
pub use model::{
    AttributedGraph, Business, CompactGraph, EdgeKey, OpeningHours, OpeningPeriod, StreetEdge,
    StreetNode, WeekTime,
};
pub use rescoring::{DepartureTime, RescoreSummary, open_businesses_at, rescore};
pub use routing::{
    NoPathReason, PathResult, RouteMetrics, RoutePath, WeightKind, graph_to_geojson,
    route_to_geojson, shortest_path, to_geojson_string,
};
pub use scoring::{
    DangerComponents, RoutingWeights, SafestWeightShape, ScoringConfig, ScoringSummary,
    score_graph,
};
pub use shared::{GraphSnapshot, SharedGraph};

/// Opaque identifier of a street node in the source data (OSM node id)
pub type NodeId = i64;
/// Position of a node inside a `CompactGraph`
pub type NodeIdx = u32;
/// Position of a directed edge inside a `CompactGraph` (post CSR sort)
pub type EdgeIdx = usize;
