//! Data model for pedestrian safety routing
//!
//! Contains the attributed street network handed over by the graph-building
//! collaborator, the classification tables used by scoring, business records
//! and the packed `CompactGraph` used for routing.

pub mod business;
pub mod compact;
pub mod land_cover;
pub mod road_class;
pub mod streets;

pub use business::{Business, OpeningHours, OpeningPeriod, WeekTime, validate_businesses};
pub use compact::{CompactGraph, EdgeKey, EdgePreview, EdgeScores, GraphSummary, Topology};
pub use land_cover::LandCover;
pub use road_class::{Highway, RoadClass};
pub use streets::{AttributedGraph, EdgeSignals, StreetEdge, StreetNode};
