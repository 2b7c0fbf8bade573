//! Time-of-day rescoring of a packed graph.
//!
//! Only the business component depends on time. Darkness, sidewalk, land
//! and speed columns are reused as stored, the business score, danger and
//! both weights are recomputed for every edge. Topology and geometry are
//! never touched.

mod departure;

use geo::Point;
use rayon::prelude::*;

pub use departure::DepartureTime;

use crate::model::compact::rescore_edge;
use crate::model::{Business, CompactGraph};
use crate::scoring::{BusinessIndex, business_score, midpoint};

/// Outcome of a rescoring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescoreSummary {
    pub open_businesses: usize,
    pub total_businesses: usize,
    pub edges_near_open: usize,
    /// Edges whose danger score changed
    pub edges_changed: usize,
}

/// Businesses open at `at`; records without hours count as open
pub fn open_businesses_at(businesses: &[Business], at: DepartureTime) -> Vec<&Business> {
    businesses
        .iter()
        .filter(|business| business.is_open_at(at))
        .collect()
}

/// Recomputes business proximity and everything derived from it, in place.
///
/// An empty `businesses` slice means proximity is unknown, which gives
/// every edge the neutral business score. Rescoring twice with the same
/// inputs yields identical columns.
pub fn rescore(graph: &mut CompactGraph, businesses: &[Business], at: DepartureTime) -> RescoreSummary {
    let open = open_businesses_at(businesses, at);
    let index = BusinessIndex::new(open.iter().copied());
    let known = !businesses.is_empty();

    let (topology, scores, config) = graph.parts_mut();
    let radius = config.business_radius_m;

    let updated: Vec<_> = (0..topology.edge_count())
        .into_par_iter()
        .map(|edge| {
            let nearby = known.then(|| {
                let u = topology.edge_u[edge] as usize;
                let v = topology.indices[edge] as usize;
                let a = Point::new(topology.node_x[u], topology.node_y[u]);
                let b = Point::new(topology.node_x[v], topology.node_y[v]);
                index.count_within(midpoint(a, b), radius)
            });
            let scored = rescore_edge(topology, edge, business_score(nearby), config);
            (scored, nearby.unwrap_or(0))
        })
        .collect();

    let mut summary = RescoreSummary {
        open_businesses: open.len(),
        total_businesses: businesses.len(),
        edges_near_open: 0,
        edges_changed: 0,
    };
    for (edge, &(scored, nearby)) in updated.iter().enumerate() {
        if nearby > 0 {
            summary.edges_near_open += 1;
        }
        if scores.danger[edge] != scored.danger {
            summary.edges_changed += 1;
        }
        scores.set(edge, &scored, nearby);
    }

    log::info!(
        "Rescored {} edges for {at}: {}/{} businesses open, {} edges near an open business, {} changed",
        updated.len(),
        summary.open_businesses,
        summary.total_businesses,
        summary.edges_near_open,
        summary.edges_changed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::build_compact_graph;
    use crate::model::{AttributedGraph, OpeningHours, OpeningPeriod, StreetEdge, StreetNode, WeekTime};
    use crate::scoring::{BUSINESS_ISOLATED, BUSINESS_NEAR_OPEN, BUSINESS_UNKNOWN, ScoringConfig};

    fn two_blocks() -> CompactGraph {
        let mut input = AttributedGraph::new();
        input
            .add_node(StreetNode::new(1, -78.6400, 35.7800))
            .add_node(StreetNode::new(2, -78.6400, 35.7810))
            .add_node(StreetNode::new(3, -78.6400, 35.7900))
            .add_edge(StreetEdge::new(1, 2, 111.0).with_highway("residential"))
            .add_edge(StreetEdge::new(2, 3, 1000.0).with_highway("residential"));
        build_compact_graph(&input, &ScoringConfig::default()).unwrap()
    }

    fn weekday_cafe() -> Business {
        Business::new(35.7805, -78.6400, "Weekday Cafe").with_hours(OpeningHours::new(
            (1..=5)
                .map(|day| OpeningPeriod::new(WeekTime::new(day, 7, 0), WeekTime::new(day, 15, 0)))
                .collect(),
        ))
    }

    #[test]
    fn opening_hours_drive_business_score() {
        let mut graph = two_blocks();
        let businesses = [weekday_cafe()];

        let summary = rescore(&mut graph, &businesses, DepartureTime::new(2, 9, 0));
        assert_eq!(summary.open_businesses, 1);
        assert_eq!(summary.edges_near_open, 1);
        assert_eq!(graph.scores().business, vec![BUSINESS_NEAR_OPEN, BUSINESS_ISOLATED]);
        assert_eq!(graph.scores().business_count, vec![1, 0]);
        let day_danger = graph.scores().danger[0];

        let summary = rescore(&mut graph, &businesses, DepartureTime::new(2, 22, 0));
        assert_eq!(summary.open_businesses, 0);
        assert_eq!(summary.edges_changed, 1);
        assert_eq!(graph.scores().business, vec![BUSINESS_ISOLATED, BUSINESS_ISOLATED]);
        // 15 * (0.9 - 0.3)
        assert!((graph.scores().danger[0] - day_danger - 9.0).abs() < 1e-9);
    }

    #[test]
    fn rescoring_is_idempotent() {
        let mut graph = two_blocks();
        let businesses = [weekday_cafe(), Business::new(35.7899, -78.6401, "Late Diner")];
        let at = DepartureTime::new(4, 12, 30);

        rescore(&mut graph, &businesses, at);
        let once = graph.scores().clone();
        let summary = rescore(&mut graph, &businesses, at);
        assert_eq!(graph.scores(), &once);
        assert_eq!(summary.edges_changed, 0);
    }

    #[test]
    fn topology_is_untouched() {
        let mut graph = two_blocks();
        let before = graph.clone();
        rescore(&mut graph, &[weekday_cafe()], DepartureTime::new(1, 8, 0));
        assert!(graph.shares_topology(&before));
        assert_eq!(graph.topology().indptr, before.topology().indptr);
        assert_eq!(graph.topology().darkness, before.topology().darkness);
        // the clone kept its own score columns
        assert_eq!(before.scores().business, vec![BUSINESS_UNKNOWN, BUSINESS_UNKNOWN]);
    }

    #[test]
    fn no_known_businesses_is_unknown() {
        let mut graph = two_blocks();
        rescore(&mut graph, &[weekday_cafe()], DepartureTime::new(1, 8, 0));
        rescore(&mut graph, &[], DepartureTime::new(1, 8, 0));
        assert_eq!(graph.scores().business, vec![BUSINESS_UNKNOWN, BUSINESS_UNKNOWN]);
        assert_eq!(graph.scores().business_count, vec![0, 0]);
    }

    #[test]
    fn filters_open_businesses() {
        let businesses = [weekday_cafe(), Business::new(35.0, -78.0, "No Hours Listed")];
        assert_eq!(open_businesses_at(&businesses, DepartureTime::new(0, 10, 0)).len(), 1);
        assert_eq!(open_businesses_at(&businesses, DepartureTime::new(3, 10, 0)).len(), 2);
    }
}
