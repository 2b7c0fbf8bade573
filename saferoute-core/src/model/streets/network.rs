//! Attributed street graph snapshot

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{StreetEdge, StreetNode};
use crate::NodeId;

/// Directed multigraph with raw edge attributes, keyed by source node ids.
///
/// Edges reference nodes by id, so an edge may point at a node that is not
/// part of the snapshot; such edges are dropped when the graph is packed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributedGraph {
    pub nodes: Vec<StreetNode>,
    pub edges: Vec<StreetEdge>,
}

impl AttributedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: StreetNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(&mut self, edge: StreetEdge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Maps node ids to their position in `nodes`, first occurrence wins
    pub(crate) fn node_positions(&self) -> HashMap<NodeId, usize> {
        let mut positions = HashMap::with_capacity(self.nodes.len());
        for (position, node) in self.nodes.iter().enumerate() {
            positions.entry(node.id).or_insert(position);
        }
        positions
    }
}
