//! Danger Scorer
//!
//! Turns the raw signals of an edge into five danger components, one
//! composite danger score and the two routing weights read by the search.

mod components;
mod config;
mod graph;

pub use components::{
    BUSINESS_ISOLATED, BUSINESS_NEAR_OPEN, BUSINESS_UNKNOWN, DangerComponents, EdgeContext,
    RoutingWeights, ScoredEdge, business_score, darkness_score, score_edge, speed_risk,
};
pub use config::{ComponentWeights, SafestWeightShape, ScoringConfig};
pub use graph::{BusinessIndex, ScoringSummary, score_graph};
pub(crate) use graph::midpoint;
