mod state;

use std::collections::BinaryHeap;

use state::State;

use super::{NoPathReason, PathResult, RoutePath, WeightKind};
use crate::model::CompactGraph;
use crate::{EdgeIdx, NodeId, NodeIdx};

/// Single pair Dijkstra over the CSR adjacency of `graph`.
///
/// The search reads the weight column chosen by `kind` and stops as soon as
/// the goal is settled. Predecessor edges are tracked so the exact parallel
/// edge taken is part of the result.
///
/// # Panics
///
/// Panics if a relaxed edge carries a negative or non-finite weight; the
/// scorer never produces one.
pub fn shortest_path(
    graph: &CompactGraph,
    start: NodeId,
    goal: NodeId,
    kind: WeightKind,
) -> PathResult {
    let Some(start_idx) = graph.node_index(start) else {
        return PathResult::NoPath {
            reason: NoPathReason::UnknownStart,
        };
    };
    let Some(goal_idx) = graph.node_index(goal) else {
        return PathResult::NoPath {
            reason: NoPathReason::UnknownEnd,
        };
    };

    let weights = graph.weights(kind);
    let node_count = graph.node_count();
    let mut distances = vec![f64::INFINITY; node_count];
    let mut predecessors: Vec<Option<(NodeIdx, EdgeIdx)>> = vec![None; node_count];
    let mut heap = BinaryHeap::new();

    distances[start_idx as usize] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: start_idx,
    });

    let mut settled = 0usize;
    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if cost > distances[node as usize] {
            continue;
        }
        settled += 1;
        if node == goal_idx {
            break;
        }

        for edge in graph.out_edges(node) {
            let weight = weights[edge];
            assert!(
                weight.is_finite() && weight >= 0.0,
                "edge {edge} has invalid {} weight {weight}",
                kind.as_str()
            );
            let next = graph.edge_target(edge);
            let next_cost = cost + weight;
            if next_cost < distances[next as usize] {
                distances[next as usize] = next_cost;
                predecessors[next as usize] = Some((node, edge));
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    let cost = distances[goal_idx as usize];
    if cost.is_infinite() {
        log::debug!("No {} path {start} -> {goal}", kind.as_str());
        return PathResult::NoPath {
            reason: NoPathReason::Unreachable,
        };
    }
    log::trace!(
        "{} path {start} -> {goal}: cost {cost}, {settled} nodes settled",
        kind.as_str()
    );

    let (nodes, edges) = reconstruct(graph, &predecessors, start_idx, goal_idx);
    PathResult::Found(RoutePath { nodes, edges, cost })
}

/// Walks predecessor links back from the goal
fn reconstruct(
    graph: &CompactGraph,
    predecessors: &[Option<(NodeIdx, EdgeIdx)>],
    start: NodeIdx,
    goal: NodeIdx,
) -> (Vec<NodeId>, Vec<EdgeIdx>) {
    let mut nodes = vec![graph.node_id(goal)];
    let mut edges = Vec::new();
    let mut current = goal;
    while current != start {
        let Some((previous, edge)) = predecessors[current as usize] else {
            unreachable!("settled node {current} has no predecessor");
        };
        nodes.push(graph.node_id(previous));
        edges.push(edge);
        current = previous;
    }
    nodes.reverse();
    edges.reverse();
    (nodes, edges)
}
