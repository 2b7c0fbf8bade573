use geo::Coord;
use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::model::compact::{EdgeScores, Topology};
use crate::model::{AttributedGraph, CompactGraph, LandCover, StreetEdge};
use crate::scoring::{DangerComponents, ScoredEdge, ScoringConfig};
use crate::{Error, NodeId, NodeIdx};

/// Packs a scored attributed graph into a `CompactGraph`
///
/// Node order follows the input; duplicated node ids keep their first
/// occurrence. Edges whose endpoints are not in the node set are dropped.
/// Danger and both weights are recomputed from each edge's components with
/// `config`, so the packed columns are always consistent.
///
/// # Errors
///
/// Returns an error if `config` could produce invalid routing weights
pub fn build_compact_graph(
    graph: &AttributedGraph,
    config: &ScoringConfig,
) -> Result<CompactGraph, Error> {
    config.validate()?;

    let mut topology = Topology::default();
    collect_nodes(graph, &mut topology)?;

    let endpoints = resolve_endpoints(graph, &topology.node_id_to_idx);
    let dropped = graph.edges.len() - endpoints.len();
    if dropped > 0 {
        warn!("Dropped {dropped} edges with an endpoint outside the node set");
    }

    // Stable sort keeps parallel edges in input order
    let mut order: Vec<usize> = (0..endpoints.len()).collect();
    order.sort_by_key(|&i| endpoints[i].1);

    topology.indptr = offsets(topology.node_count(), endpoints.iter().map(|&(_, u, _)| u));

    let edge_count = order.len();
    reserve_edges(&mut topology, edge_count);
    let mut scores = EdgeScores::with_capacity(edge_count);
    let mut unscored = 0usize;
    let mut saturated = 0usize;

    topology.geom_indptr.push(0);
    for &i in &order {
        let (position, u, v) = endpoints[i];
        let edge = &graph.edges[position];
        if edge.components.is_none() {
            unscored += 1;
        }
        let scored = push_edge(&mut topology, edge, u, v, config);
        if scored.weights.is_saturated() {
            saturated += 1;
        }
        scores.push(&scored, edge.business_count);
    }

    if saturated > 0 {
        warn!("{saturated} edges overflowed a routing weight, capped at f64::MAX");
    }

    if unscored > 0 {
        debug!("{unscored} edges carried no danger components, neutral defaults used");
    }
    info!(
        "Compact graph built: {} nodes, {} edges, {} geometry points",
        topology.node_count(),
        topology.edge_count(),
        topology.geom_x.len()
    );

    Ok(CompactGraph::from_parts(topology, scores, config.clone()))
}

fn collect_nodes(graph: &AttributedGraph, topology: &mut Topology) -> Result<(), Error> {
    let capacity = graph.nodes.len();
    topology.node_ids.reserve(capacity);
    topology.node_x.reserve(capacity);
    topology.node_y.reserve(capacity);
    topology.node_id_to_idx.reserve(capacity);

    let mut duplicates = 0usize;
    for node in &graph.nodes {
        if topology.node_id_to_idx.contains_key(&node.id) {
            duplicates += 1;
            continue;
        }
        let idx = NodeIdx::try_from(topology.node_ids.len())
            .map_err(|_| Error::InvalidData("too many nodes for a compact graph".to_string()))?;
        topology.node_id_to_idx.insert(node.id, idx);
        topology.node_ids.push(node.id);
        topology.node_x.push(node.geometry.x());
        topology.node_y.push(node.geometry.y());
    }
    if duplicates > 0 {
        warn!("Ignored {duplicates} duplicated node ids");
    }
    Ok(())
}

/// `(input position, source index, target index)` of every edge with both endpoints present
fn resolve_endpoints(
    graph: &AttributedGraph,
    node_id_to_idx: &HashMap<NodeId, NodeIdx>,
) -> Vec<(usize, NodeIdx, NodeIdx)> {
    graph
        .edges
        .iter()
        .enumerate()
        .filter_map(|(position, edge)| {
            let u = node_id_to_idx.get(&edge.source)?;
            let v = node_id_to_idx.get(&edge.target)?;
            Some((position, *u, *v))
        })
        .collect()
}

/// Cumulative out-degree offsets, `offsets[i + 1] = offsets[i] + outdegree(i)`
fn offsets(node_count: usize, sources: impl Iterator<Item = NodeIdx>) -> Vec<usize> {
    let mut indptr = vec![0usize; node_count + 1];
    for u in sources {
        indptr[u as usize + 1] += 1;
    }
    for i in 0..node_count {
        indptr[i + 1] += indptr[i];
    }
    indptr
}

fn reserve_edges(topology: &mut Topology, edges: usize) {
    topology.indices.reserve(edges);
    topology.edge_u.reserve(edges);
    topology.edge_key.reserve(edges);
    topology.geom_indptr.reserve(edges + 1);
    topology.length.reserve(edges);
    topology.travel_time.reserve(edges);
    topology.speed_kph.reserve(edges);
    topology.is_footpath.reserve(edges);
    topology.light_count.reserve(edges);
    topology.road_class.reserve(edges);
    topology.land_cover.reserve(edges);
    topology.darkness.reserve(edges);
    topology.sidewalk.reserve(edges);
    topology.land_risk.reserve(edges);
    topology.speed_risk.reserve(edges);
}

fn push_edge(
    topology: &mut Topology,
    edge: &StreetEdge,
    u: NodeIdx,
    v: NodeIdx,
    config: &ScoringConfig,
) -> ScoredEdge {
    let length = edge.sanitized_length();
    let travel_time = edge.sanitized_travel_time(config.walking_speed_kph);

    let mut components = edge.components.unwrap_or_default().clamped();
    // The road class wins over a stored sidewalk score, keeping it binary
    let is_footpath = match edge.highway {
        Some(_) => edge.highway().is_footpath(),
        None => components.is_footpath(),
    };
    components.sidewalk = if is_footpath { 1.0 } else { 0.0 };
    let scored = ScoredEdge::from_components(components, length, travel_time, config);

    topology.indices.push(v);
    topology.edge_u.push(u);
    topology.edge_key.push(edge.key);
    topology.length.push(length);
    topology.travel_time.push(travel_time);
    topology.speed_kph.push(if length > 0.0 && travel_time > 0.0 {
        length / travel_time * 3.6
    } else {
        config.walking_speed_kph
    });
    topology.is_footpath.push(is_footpath);
    topology.light_count.push(edge.signals.light_count);
    topology.road_class.push(edge.highway().class);
    topology.land_cover.push(LandCover::from_optional_code(edge.signals.land_cover));
    push_components(topology, &scored.components);
    push_geometry(topology, edge, u, v);

    scored
}

fn push_components(topology: &mut Topology, components: &DangerComponents) {
    topology.darkness.push(components.darkness);
    topology.sidewalk.push(components.sidewalk);
    topology.land_risk.push(components.land_risk);
    topology.speed_risk.push(components.speed_risk);
}

/// Appends the edge polyline, or a straight segment between its endpoints
fn push_geometry(topology: &mut Topology, edge: &StreetEdge, u: NodeIdx, v: NodeIdx) {
    match edge.geometry.as_ref().filter(|line| line.0.len() >= 2) {
        Some(line) => {
            for Coord { x, y } in line.coords().copied() {
                topology.geom_x.push(x);
                topology.geom_y.push(y);
            }
        }
        None => {
            for node in [u as usize, v as usize] {
                topology.geom_x.push(topology.node_x[node]);
                topology.geom_y.push(topology.node_y[node]);
            }
        }
    }
    topology.geom_indptr.push(topology.geom_x.len());
}
