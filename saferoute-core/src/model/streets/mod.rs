//! Attributed street network supplied by the graph-building collaborator

pub mod components;
pub mod network;

pub use components::{EdgeSignals, StreetEdge, StreetNode};
pub use network::AttributedGraph;
