use serde::Serialize;

use super::RoutePath;
use crate::model::CompactGraph;

/// Aggregates shown next to a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RouteMetrics {
    pub distance_m: f64,
    pub travel_time_s: f64,
    pub avg_speed_kmh: f64,
    /// Σ (100 - danger) × km
    pub safety_score: f64,
    /// Length-weighted mean of `100 - danger`
    pub mean_safety: f64,
    /// Percent of edges that are footpaths
    pub footpath_coverage: f64,
    /// Percent of edges with at least one streetlight
    pub lit_coverage: f64,
    /// Edges with an open business nearby
    pub nearby_businesses: usize,
}

impl RouteMetrics {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_path(graph: &CompactGraph, path: &RoutePath) -> Self {
        if path.edges.is_empty() {
            return Self::default();
        }
        let topology = graph.topology();
        let scores = graph.scores();

        let mut metrics = Self::default();
        let mut weighted_safety = 0.0;
        let mut footpaths = 0usize;
        let mut lit = 0usize;
        for &edge in &path.edges {
            let length = topology.length[edge];
            let safety = 100.0 - scores.danger[edge];
            metrics.distance_m += length;
            metrics.travel_time_s += topology.travel_time[edge];
            weighted_safety += safety * length;
            if topology.is_footpath[edge] {
                footpaths += 1;
            }
            if topology.light_count[edge] > 0 {
                lit += 1;
            }
            if scores.business_count[edge] > 0 {
                metrics.nearby_businesses += 1;
            }
        }

        let edge_count = path.edges.len() as f64;
        metrics.safety_score = weighted_safety / 1000.0;
        if metrics.distance_m > 0.0 {
            metrics.mean_safety = weighted_safety / metrics.distance_m;
        }
        if metrics.travel_time_s > 0.0 {
            metrics.avg_speed_kmh = metrics.distance_m / metrics.travel_time_s * 3.6;
        }
        metrics.footpath_coverage = percent(footpaths as f64 / edge_count);
        metrics.lit_coverage = percent(lit as f64 / edge_count);
        metrics
    }
}

/// Fraction as a percentage rounded to one decimal
fn percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::build_compact_graph;
    use crate::model::{AttributedGraph, EdgeSignals, StreetEdge, StreetNode};
    use crate::routing::{WeightKind, shortest_path};
    use crate::scoring::ScoringConfig;

    fn corridor() -> CompactGraph {
        let mut input = AttributedGraph::new();
        input
            .add_node(StreetNode::new(1, 0.0, 0.0))
            .add_node(StreetNode::new(2, 0.001, 0.0))
            .add_node(StreetNode::new(3, 0.002, 0.0))
            .add_node(StreetNode::new(4, 0.003, 0.0))
            .add_edge(
                StreetEdge::new(1, 2, 100.0)
                    .with_highway("footway")
                    .with_travel_time(60.0)
                    .with_signals(EdgeSignals {
                        light_count: 2,
                        ..EdgeSignals::default()
                    }),
            )
            .add_edge(
                StreetEdge::new(2, 3, 200.0)
                    .with_highway("residential")
                    .with_travel_time(120.0),
            )
            .add_edge(
                StreetEdge::new(3, 4, 100.0)
                    .with_highway("residential")
                    .with_travel_time(60.0),
            );
        let mut graph = build_compact_graph(&input, &ScoringConfig::default()).unwrap();
        graph.parts_mut().1.business_count[0] = 3;
        graph
    }

    #[test]
    fn aggregates_along_route() {
        let graph = corridor();
        let path = shortest_path(&graph, 1, 4, WeightKind::Fastest).into_path().unwrap();
        let metrics = RouteMetrics::from_path(&graph, &path);

        assert_eq!(metrics.distance_m, 400.0);
        assert_eq!(metrics.travel_time_s, 240.0);
        assert!((metrics.avg_speed_kmh - 6.0).abs() < 1e-9);
        assert_eq!(metrics.footpath_coverage, 33.3);
        assert_eq!(metrics.lit_coverage, 33.3);
        assert_eq!(metrics.nearby_businesses, 1);

        let danger = &graph.scores().danger;
        let weighted = (100.0 - danger[0]) * 100.0
            + (100.0 - danger[1]) * 200.0
            + (100.0 - danger[2]) * 100.0;
        assert!((metrics.safety_score - weighted / 1000.0).abs() < 1e-9);
        assert!((metrics.mean_safety - weighted / 400.0).abs() < 1e-9);
    }

    #[test]
    fn single_node_route_is_all_zero() {
        let graph = corridor();
        let path = shortest_path(&graph, 2, 2, WeightKind::Safest).into_path().unwrap();
        assert_eq!(RouteMetrics::from_path(&graph, &path), RouteMetrics::default());
    }
}
