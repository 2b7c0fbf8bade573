use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::model::CompactGraph;
use crate::{NodeId, NodeIdx};

/// Snaps coordinates to the closest node of a `CompactGraph`.
///
/// Distances are planar in lon/lat degrees, which is accurate enough for
/// picking a start or end node inside one city. Nodes without finite
/// coordinates are never returned.
pub struct NodeLocator {
    tree: RTree<GeomWithData<[f64; 2], NodeIdx>>,
    node_ids: Vec<NodeId>,
}

impl NodeLocator {
    pub fn new(graph: &CompactGraph) -> Self {
        let topology = graph.topology();
        let points: Vec<_> = topology
            .node_x
            .iter()
            .zip(&topology.node_y)
            .zip(0..)
            .filter(|((x, y), _)| x.is_finite() && y.is_finite())
            .map(|((&x, &y), idx)| GeomWithData::new([x, y], idx))
            .collect();
        let skipped = topology.node_count() - points.len();
        if skipped > 0 {
            log::warn!("{skipped} nodes without finite coordinates cannot be snapped to");
        }
        Self {
            tree: RTree::bulk_load(points),
            node_ids: topology.node_ids.clone(),
        }
    }

    /// Index of the node nearest to `(lon, lat)`, `None` for an empty graph
    pub fn nearest_index(&self, lon: f64, lat: f64) -> Option<NodeIdx> {
        self.tree.nearest_neighbor(&[lon, lat]).map(|node| node.data)
    }

    /// Id of the node nearest to `(lon, lat)`, `None` for an empty graph
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<NodeId> {
        self.nearest_index(lon, lat)
            .map(|idx| self.node_ids[idx as usize])
    }
}
