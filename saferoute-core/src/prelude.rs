// Re-export key components
pub use crate::loading::{NodeLocator, build_compact_graph};
pub use crate::rescoring::{DepartureTime, RescoreSummary, open_businesses_at, rescore};
pub use crate::routing::{
    NoPathReason, PathResult, RouteMetrics, RoutePath, WeightKind, graph_to_geojson,
    route_to_geojson, shortest_path, to_geojson_string,
};
pub use crate::scoring::{
    ComponentWeights, DangerComponents, EdgeContext, RoutingWeights, SafestWeightShape,
    ScoredEdge, ScoringConfig, ScoringSummary, score_edge, score_graph,
};
pub use crate::shared::{GraphSnapshot, SharedGraph};

// Street network model
pub use crate::model::{
    AttributedGraph, Business, CompactGraph, EdgeKey, EdgeSignals, GraphSummary, Highway,
    LandCover, OpeningHours, OpeningPeriod, RoadClass, StreetEdge, StreetNode, WeekTime,
};

pub use crate::Error;
pub use crate::{EdgeIdx, NodeId, NodeIdx};
