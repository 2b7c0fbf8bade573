//! Initial scoring pass over an attributed street graph

use geo::{Distance, Haversine, Point};
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use super::{DangerComponents, EdgeContext, ScoringConfig};
use crate::model::{AttributedGraph, Business, StreetNode};

/// Meters per degree of latitude, rounded down so envelopes err on the wide side
const METERS_PER_DEGREE: f64 = 110_000.0;

/// Spatial index of business locations answering radius counts
pub struct BusinessIndex {
    tree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl BusinessIndex {
    /// Records without finite coordinates are left out of the index
    pub fn new<'a>(businesses: impl IntoIterator<Item = &'a Business>) -> Self {
        let mut skipped = 0usize;
        let points: Vec<_> = businesses
            .into_iter()
            .enumerate()
            .filter_map(|(i, business)| {
                if business.lat.is_finite() && business.lon.is_finite() {
                    Some(GeomWithData::new([business.lon, business.lat], i))
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect();
        if skipped > 0 {
            log::warn!("Ignored {skipped} businesses without finite coordinates");
        }
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Businesses within `radius_m` meters (haversine) of `point`
    pub fn count_within(&self, point: Point<f64>, radius_m: f64) -> u32 {
        let envelope = degree_envelope(point, radius_m);
        let count = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|candidate| {
                let [lon, lat] = *candidate.geom();
                Haversine.distance(point, Point::new(lon, lat)) <= radius_m
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Lon/lat box that contains every point within `radius_m` of `center`.
/// Does not wrap at the antimeridian.
fn degree_envelope(center: Point<f64>, radius_m: f64) -> AABB<[f64; 2]> {
    let d_lat = radius_m / METERS_PER_DEGREE;
    let widest_lat = (center.y().abs() + d_lat).min(90.0).to_radians();
    let d_lon = (d_lat / widest_lat.cos().max(1e-9)).min(360.0);
    AABB::from_corners(
        [center.x() - d_lon, center.y() - d_lat],
        [center.x() + d_lon, center.y() + d_lat],
    )
}

/// Average of the two endpoint coordinates
pub(crate) fn midpoint(a: Point<f64>, b: Point<f64>) -> Point<f64> {
    Point::new((a.x() + b.x()) / 2.0, (a.y() + b.y()) / 2.0)
}

/// Outcome of a scoring pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringSummary {
    pub edges_scored: usize,
    pub footpaths: usize,
    pub near_open_business: usize,
    pub mean_danger: f64,
}

/// Annotates every edge of `graph` with its danger components.
///
/// Every supplied business is a candidate; time-of-day filtering is the
/// rescorer's job. With no businesses at all edges get the neutral
/// "unknown" business score. Edges whose endpoints are missing from the node
/// set are still scored, without business proximity.
#[allow(clippy::cast_precision_loss)]
pub fn score_graph(
    graph: &mut AttributedGraph,
    businesses: &[Business],
    config: &ScoringConfig,
) -> ScoringSummary {
    let positions = graph.node_positions();
    let index = BusinessIndex::new(businesses);
    let AttributedGraph { nodes, edges } = graph;
    let nodes: &[StreetNode] = nodes;

    edges.par_iter_mut().for_each(|edge| {
        let endpoints = positions
            .get(&edge.source)
            .zip(positions.get(&edge.target))
            .map(|(&u, &v)| (nodes[u].geometry, nodes[v].geometry));

        let nearby = match endpoints {
            Some((a, b)) if !index.is_empty() => {
                Some(index.count_within(midpoint(a, b), config.business_radius_m))
            }
            _ => None,
        };

        let context = EdgeContext::from_edge(edge, nearby, config);
        let components = DangerComponents::from_context(&context, config);
        log::trace!(
            "Scored edge {} -> {} ({:?}): {components:?}",
            edge.source,
            edge.target,
            context.highway.class
        );
        edge.components = Some(components);
        edge.business_count = nearby.unwrap_or(0);
    });

    let mut summary = ScoringSummary {
        edges_scored: edges.len(),
        ..ScoringSummary::default()
    };
    let mut danger_sum = 0.0;
    for edge in edges.iter() {
        let components = edge.components.unwrap_or_default();
        if components.is_footpath() {
            summary.footpaths += 1;
        }
        if edge.business_count > 0 {
            summary.near_open_business += 1;
        }
        danger_sum += components.danger(&config.weights);
    }
    if summary.edges_scored > 0 {
        summary.mean_danger = danger_sum / summary.edges_scored as f64;
    }

    log::info!(
        "Scored {} edges: {} footpaths, {} near a business ({} candidates), mean danger {:.1}",
        summary.edges_scored,
        summary.footpaths,
        summary.near_open_business,
        index.len(),
        summary.mean_danger
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeSignals, StreetEdge};
    use crate::scoring::{BUSINESS_ISOLATED, BUSINESS_NEAR_OPEN, BUSINESS_UNKNOWN};

    // ~0.0009 degrees of latitude is about 100 m
    fn sample_graph() -> AttributedGraph {
        let mut graph = AttributedGraph::new();
        graph
            .add_node(StreetNode::new(1, -78.6400, 35.7800))
            .add_node(StreetNode::new(2, -78.6400, 35.7810))
            .add_node(StreetNode::new(3, -78.6400, 35.7900))
            .add_edge(
                StreetEdge::new(1, 2, 111.0)
                    .with_highway("footway")
                    .with_signals(EdgeSignals {
                        light_count: 3,
                        ..EdgeSignals::default()
                    }),
            )
            .add_edge(StreetEdge::new(2, 3, 1000.0).with_highway("secondary"))
            .add_edge(StreetEdge::new(3, 99, 50.0).with_highway("residential"));
        graph
    }

    #[test]
    fn businesses_within_radius_of_midpoint() {
        let index = BusinessIndex::new(&[
            Business::new(35.7805, -78.6400, "on the spot"),
            Business::new(35.7812, -78.6400, "about 78 m north"),
            Business::new(35.7830, -78.6400, "about 280 m north"),
        ]);
        let point = Point::new(-78.6400, 35.7805);
        assert_eq!(index.count_within(point, 100.0), 2);
        assert_eq!(index.count_within(point, 10.0), 1);
        assert_eq!(index.count_within(point, 500.0), 3);
    }

    #[test]
    fn skips_businesses_without_coordinates() {
        let mut businesses: Vec<Business> = (0..20)
            .map(|i| Business::new(35.7800 + f64::from(i) * 0.0005, -78.6400, format!("Shop {i}")))
            .collect();
        businesses.push(Business::new(f64::NAN, -78.6400, "nan"));
        businesses.push(Business::new(35.7805, f64::INFINITY, "inf"));

        let index = BusinessIndex::new(&businesses);
        assert_eq!(index.len(), 20);
        // shops 0 to 3 lie within 200 m north of the first one
        assert_eq!(index.count_within(Point::new(-78.6400, 35.7800), 200.0), 4);

        let mut graph = sample_graph();
        let summary = score_graph(&mut graph, &businesses, &ScoringConfig::default());
        assert_eq!(summary.edges_scored, 3);
        assert_eq!(graph.edges[0].business_count, 3);
    }

    #[test]
    fn envelope_covers_radius_at_high_latitude() {
        let index = BusinessIndex::new(&[Business::new(69.65, 18.9600, "Tromsø")]);
        // 0.0024 degrees of longitude is about 93 m at this latitude
        assert_eq!(index.count_within(Point::new(18.9576, 69.65), 100.0), 1);
    }

    #[test]
    fn scores_every_edge() {
        let mut graph = sample_graph();
        let businesses = [Business::new(35.7806, -78.6401, "Corner Cafe")];
        let config = ScoringConfig::default();
        let summary = score_graph(&mut graph, &businesses, &config);

        assert_eq!(summary.edges_scored, 3);
        assert_eq!(summary.footpaths, 1);
        assert_eq!(summary.near_open_business, 1);

        let footway = graph.edges[0].components.unwrap();
        assert_eq!(footway.sidewalk, 1.0);
        assert_eq!(footway.business, BUSINESS_NEAR_OPEN);
        assert_eq!(graph.edges[0].business_count, 1);
        assert!(footway.darkness < 1.0);

        let secondary = graph.edges[1].components.unwrap();
        assert_eq!(secondary.business, BUSINESS_ISOLATED);
        assert_eq!(secondary.darkness, 1.0);
        assert!((secondary.speed_risk - 25.0 / 35.0).abs() < 1e-12);

        // dangling edge has no midpoint
        let dangling = graph.edges[2].components.unwrap();
        assert_eq!(dangling.business, BUSINESS_UNKNOWN);
    }

    #[test]
    fn no_businesses_means_unknown() {
        let mut graph = sample_graph();
        score_graph(&mut graph, &[], &ScoringConfig::default());
        assert!(
            graph
                .edges
                .iter()
                .all(|edge| edge.components.unwrap().business == BUSINESS_UNKNOWN)
        );
    }
}
