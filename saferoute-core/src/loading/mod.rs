//! Compact graph construction from an attributed street graph snapshot,
//! plus coordinate snapping onto the packed nodes.

mod builder;
mod locator;

pub use builder::build_compact_graph;
pub use locator::NodeLocator;
