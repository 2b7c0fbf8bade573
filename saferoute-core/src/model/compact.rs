//! Structure-of-arrays street graph with CSR adjacency

use std::ops::Range;
use std::sync::Arc;

use geo::{Coord, LineString, Point};
use hashbrown::HashMap;
use serde::Serialize;

use crate::model::{LandCover, RoadClass};
use crate::routing::WeightKind;
use crate::scoring::{DangerComponents, ScoredEdge, ScoringConfig};
use crate::{EdgeIdx, NodeId, NodeIdx};

/// Identifies a directed source edge: `(source, target, key)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
    pub key: u32,
}

/// Columns fixed when the graph is built.
///
/// Edge columns are indexed by CSR position: edges are stably sorted by
/// source node, so the out-edges of node `i` are `indptr[i]..indptr[i + 1]`
/// and `indices[e]` is the target of edge `e`.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub node_ids: Vec<NodeId>,
    /// Longitude
    pub node_x: Vec<f64>,
    /// Latitude
    pub node_y: Vec<f64>,
    pub node_id_to_idx: HashMap<NodeId, NodeIdx>,

    pub indptr: Vec<usize>,
    pub indices: Vec<NodeIdx>,
    pub edge_u: Vec<NodeIdx>,
    pub edge_key: Vec<u32>,

    /// Polyline of edge `e` is `geom_x/geom_y[geom_indptr[e]..geom_indptr[e + 1]]`
    pub geom_indptr: Vec<usize>,
    pub geom_x: Vec<f64>,
    pub geom_y: Vec<f64>,

    pub length: Vec<f64>,
    pub travel_time: Vec<f64>,
    pub speed_kph: Vec<f64>,
    pub is_footpath: Vec<bool>,
    pub light_count: Vec<u32>,
    pub road_class: Vec<RoadClass>,
    pub land_cover: Vec<LandCover>,

    // Time-invariant danger components
    pub darkness: Vec<f64>,
    pub sidewalk: Vec<f64>,
    pub land_risk: Vec<f64>,
    pub speed_risk: Vec<f64>,
}

impl Topology {
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.indices.len()
    }

    /// Panics when the arrays disagree with each other
    fn assert_consistent(&self) {
        let nodes = self.node_count();
        let edges = self.edge_count();
        assert_eq!(self.node_x.len(), nodes, "node_x length");
        assert_eq!(self.node_y.len(), nodes, "node_y length");
        assert_eq!(self.indptr.len(), nodes + 1, "indptr length");
        assert_eq!(self.indptr.first().copied(), Some(0), "indptr start");
        assert_eq!(self.indptr[nodes], edges, "indptr end");
        assert!(
            self.indptr.windows(2).all(|w| w[0] <= w[1]),
            "indptr must be non-decreasing"
        );
        assert!(
            self.indices
                .iter()
                .chain(&self.edge_u)
                .all(|&node| (node as usize) < nodes),
            "edge endpoint out of range"
        );
        for (name, len) in [
            ("edge_u", self.edge_u.len()),
            ("edge_key", self.edge_key.len()),
            ("length", self.length.len()),
            ("travel_time", self.travel_time.len()),
            ("speed_kph", self.speed_kph.len()),
            ("is_footpath", self.is_footpath.len()),
            ("light_count", self.light_count.len()),
            ("road_class", self.road_class.len()),
            ("land_cover", self.land_cover.len()),
            ("darkness", self.darkness.len()),
            ("sidewalk", self.sidewalk.len()),
            ("land_risk", self.land_risk.len()),
            ("speed_risk", self.speed_risk.len()),
        ] {
            assert_eq!(len, edges, "{name} length");
        }
        assert_eq!(self.geom_indptr.len(), edges + 1, "geom_indptr length");
        assert_eq!(self.geom_x.len(), self.geom_y.len(), "geometry columns");
        assert_eq!(
            self.geom_indptr.last().copied(),
            Some(self.geom_x.len()),
            "geom_indptr end"
        );
    }
}

/// Columns recomputed whenever business proximity changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeScores {
    pub business: Vec<f64>,
    pub business_count: Vec<u32>,
    pub danger: Vec<f64>,
    pub weight_fastest: Vec<f64>,
    pub weight_safest: Vec<f64>,
}

impl EdgeScores {
    pub(crate) fn with_capacity(edges: usize) -> Self {
        Self {
            business: Vec::with_capacity(edges),
            business_count: Vec::with_capacity(edges),
            danger: Vec::with_capacity(edges),
            weight_fastest: Vec::with_capacity(edges),
            weight_safest: Vec::with_capacity(edges),
        }
    }

    pub(crate) fn push(&mut self, scored: &ScoredEdge, business_count: u32) {
        self.business.push(scored.components.business);
        self.business_count.push(business_count);
        self.danger.push(scored.danger);
        self.weight_fastest.push(scored.weights.fastest);
        self.weight_safest.push(scored.weights.safest);
    }

    pub(crate) fn set(&mut self, edge: EdgeIdx, scored: &ScoredEdge, business_count: u32) {
        self.business[edge] = scored.components.business;
        self.business_count[edge] = business_count;
        self.danger[edge] = scored.danger;
        self.weight_fastest[edge] = scored.weights.fastest;
        self.weight_safest[edge] = scored.weights.safest;
    }

    fn len(&self) -> usize {
        self.danger.len()
    }
}

/// Packed, scored street graph.
///
/// Topology is shared behind an `Arc`, so cloning a graph only copies the
/// score columns. Routing reads it, rescoring rewrites `EdgeScores` in place.
#[derive(Debug, Clone)]
pub struct CompactGraph {
    topology: Arc<Topology>,
    scores: EdgeScores,
    config: ScoringConfig,
}

impl CompactGraph {
    pub(crate) fn from_parts(topology: Topology, scores: EdgeScores, config: ScoringConfig) -> Self {
        topology.assert_consistent();
        assert_eq!(scores.len(), topology.edge_count(), "score columns length");
        Self {
            topology: Arc::new(topology),
            scores,
            config,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn scores(&self) -> &EdgeScores {
        &self.scores
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub(crate) fn parts_mut(&mut self) -> (&Topology, &mut EdgeScores, &ScoringConfig) {
        (&self.topology, &mut self.scores, &self.config)
    }

    /// Whether two graphs share the same topology allocation
    pub fn shares_topology(&self, other: &CompactGraph) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology)
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIdx> {
        self.topology.node_id_to_idx.get(&id).copied()
    }

    pub fn node_id(&self, node: NodeIdx) -> NodeId {
        self.topology.node_ids[node as usize]
    }

    pub fn node_point(&self, node: NodeIdx) -> Point<f64> {
        let i = node as usize;
        Point::new(self.topology.node_x[i], self.topology.node_y[i])
    }

    /// CSR range of the edges leaving `node`
    pub fn out_edges(&self, node: NodeIdx) -> Range<EdgeIdx> {
        let i = node as usize;
        self.topology.indptr[i]..self.topology.indptr[i + 1]
    }

    pub fn edge_source(&self, edge: EdgeIdx) -> NodeIdx {
        self.topology.edge_u[edge]
    }

    pub fn edge_target(&self, edge: EdgeIdx) -> NodeIdx {
        self.topology.indices[edge]
    }

    /// Weight column selected by `kind`
    pub fn weights(&self, kind: WeightKind) -> &[f64] {
        match kind {
            WeightKind::Fastest => &self.scores.weight_fastest,
            WeightKind::Safest => &self.scores.weight_safest,
        }
    }

    pub fn edge_key(&self, edge: EdgeIdx) -> EdgeKey {
        EdgeKey {
            source: self.node_id(self.topology.edge_u[edge]),
            target: self.node_id(self.topology.indices[edge]),
            key: self.topology.edge_key[edge],
        }
    }

    /// Source `(u, v, key)` triples of the given CSR edges
    pub fn edge_keys_for_path(&self, edges: &[EdgeIdx]) -> Vec<EdgeKey> {
        edges.iter().map(|&edge| self.edge_key(edge)).collect()
    }

    pub fn edge_coords(&self, edge: EdgeIdx) -> impl Iterator<Item = Coord<f64>> + '_ {
        let range = self.topology.geom_indptr[edge]..self.topology.geom_indptr[edge + 1];
        self.topology.geom_x[range.clone()]
            .iter()
            .zip(&self.topology.geom_y[range])
            .map(|(&x, &y)| Coord { x, y })
    }

    pub fn edge_geometry(&self, edge: EdgeIdx) -> LineString<f64> {
        LineString::new(self.edge_coords(edge).collect())
    }

    /// Stored time-invariant components combined with the current business score
    pub fn edge_components(&self, edge: EdgeIdx) -> DangerComponents {
        self.topology.components(edge, self.scores.business[edge])
    }

    /// Counts, averages and the first `preview` edges for display
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self, preview: usize) -> GraphSummary {
        let topology = &self.topology;
        let edge_count = self.edge_count();
        let footpaths = topology.is_footpath.iter().filter(|&&f| f).count();
        let (footpath_share, mean_danger) = if edge_count == 0 {
            (0.0, 0.0)
        } else {
            (
                footpaths as f64 / edge_count as f64,
                self.scores.danger.iter().sum::<f64>() / edge_count as f64,
            )
        };

        let edges = (0..edge_count.min(preview))
            .map(|edge| EdgePreview {
                source: self.node_id(topology.edge_u[edge]),
                target: self.node_id(topology.indices[edge]),
                length: topology.length[edge],
                safety: 100.0 - self.scores.danger[edge],
                light_count: topology.light_count[edge],
            })
            .collect();

        GraphSummary {
            node_count: self.node_count(),
            edge_count,
            footpath_share,
            mean_danger,
            edges,
        }
    }
}

impl Topology {
    pub(crate) fn components(&self, edge: EdgeIdx, business: f64) -> DangerComponents {
        DangerComponents {
            darkness: self.darkness[edge],
            sidewalk: self.sidewalk[edge],
            business,
            land_risk: self.land_risk[edge],
            speed_risk: self.speed_risk[edge],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePreview {
    pub source: NodeId,
    pub target: NodeId,
    pub length: f64,
    pub safety: f64,
    pub light_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub footpath_share: f64,
    pub mean_danger: f64,
    pub edges: Vec<EdgePreview>,
}

/// Recomputes danger and weights of one edge from its components
pub(crate) fn rescore_edge(
    topology: &Topology,
    edge: EdgeIdx,
    business: f64,
    config: &ScoringConfig,
) -> ScoredEdge {
    ScoredEdge::from_components(
        topology.components(edge, business),
        topology.length[edge],
        topology.travel_time[edge],
        config,
    )
}
