use std::sync::Arc;
use std::thread;

use saferoute_core::prelude::*;

const TZ: &str = "America/New_York";

/// Two ways from 1 to 4: through 2 past a cafe (100 m legs) or through 3,
/// a little shorter (95 m legs) but far from any business.
fn two_ways() -> AttributedGraph {
    let mut input = AttributedGraph::new();
    input
        .add_node(StreetNode::new(1, -78.6400, 35.7800))
        .add_node(StreetNode::new(2, -78.6388, 35.7808))
        .add_node(StreetNode::new(3, -78.6412, 35.7808))
        .add_node(StreetNode::new(4, -78.6400, 35.7816));
    for (source, target, length) in [(1, 2, 100.0), (2, 4, 100.0), (1, 3, 95.0), (3, 4, 95.0)] {
        input.add_edge(StreetEdge::new(source, target, length).with_highway("residential"));
    }
    input
}

/// Monday to Saturday, 08:00 to 20:00
fn cafe() -> Business {
    let periods = (1..=6)
        .map(|day| OpeningPeriod::new(WeekTime::new(day, 8, 0), WeekTime::new(day, 20, 0)))
        .collect();
    Business::new(35.7808, -78.6388, "Cafe").with_hours(OpeningHours::new(periods))
}

fn scored_graph(businesses: &[Business]) -> CompactGraph {
    let config = ScoringConfig::default();
    let mut input = two_ways();
    score_graph(&mut input, businesses, &config);
    build_compact_graph(&input, &config).unwrap()
}

fn safest_nodes(graph: &CompactGraph) -> Vec<NodeId> {
    shortest_path(graph, 1, 4, WeightKind::Safest)
        .into_path()
        .unwrap()
        .nodes
}

#[test]
fn safest_route_follows_opening_hours() {
    let businesses = [cafe()];
    let mut graph = scored_graph(&businesses);
    // the first pass counts every business regardless of hours
    assert_eq!(safest_nodes(&graph), vec![1, 2, 4]);

    // Wednesday noon local time
    let noon = DepartureTime::parse("2024-03-13T16:00:00Z", TZ).unwrap();
    let summary = rescore(&mut graph, &businesses, noon);
    assert_eq!(summary.open_businesses, 1);
    assert_eq!(summary.edges_near_open, 2);
    assert_eq!(safest_nodes(&graph), vec![1, 2, 4]);

    // Wednesday 23:00 local time
    let night = DepartureTime::parse("2024-03-14T03:00:00Z", TZ).unwrap();
    let summary = rescore(&mut graph, &businesses, night);
    assert_eq!(summary.open_businesses, 0);
    assert_eq!(summary.edges_changed, 2);
    assert_eq!(safest_nodes(&graph), vec![1, 3, 4]);
}

#[test]
fn rescoring_with_everything_open_matches_the_first_pass() {
    let businesses = [Business::new(35.7808, -78.6388, "Always Open")];
    let first_pass = scored_graph(&businesses);

    let mut rescored = first_pass.clone();
    rescore(&mut rescored, &businesses, DepartureTime::new(0, 3, 0));
    assert_eq!(rescored.scores(), first_pass.scores());
}

#[test]
fn rescoring_twice_is_idempotent() {
    let businesses = [cafe(), Business::new(35.7816, -78.6400, "Bar")];
    let mut graph = scored_graph(&businesses);
    let at = DepartureTime::parse("2024-03-16T21:30", TZ).unwrap();

    rescore(&mut graph, &businesses, at);
    let fastest = graph.weights(WeightKind::Fastest).to_vec();
    let safest = graph.weights(WeightKind::Safest).to_vec();
    rescore(&mut graph, &businesses, at);
    assert_eq!(graph.weights(WeightKind::Fastest), fastest.as_slice());
    assert_eq!(graph.weights(WeightKind::Safest), safest.as_slice());
}

#[test]
fn shared_graph_queries_see_whole_versions() {
    let businesses = Arc::new(vec![cafe()]);
    let shared = Arc::new(SharedGraph::new(scored_graph(&businesses)));
    let noon = DepartureTime::new(3, 12, 0);
    let night = DepartureTime::new(3, 23, 0);

    let writer = {
        let shared = Arc::clone(&shared);
        let businesses = Arc::clone(&businesses);
        thread::spawn(move || {
            for i in 0..50 {
                let at = if i % 2 == 0 { night } else { noon };
                shared.rescore(&businesses, at);
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = shared.snapshot();
                    let path = shortest_path(&snapshot, 1, 4, WeightKind::Safest)
                        .into_path()
                        .unwrap();
                    // edges 0 (1 -> 2) and 2 (2 -> 4) pass the cafe, a
                    // half-applied rescore would score them differently
                    let business = &snapshot.scores().business;
                    assert_eq!(business[0], business[2]);
                    let expected: f64 = path
                        .edges
                        .iter()
                        .map(|&e| snapshot.weights(WeightKind::Safest)[e])
                        .sum();
                    assert_eq!(path.cost, expected);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(shared.version(), 50);
    // last rescore was at noon
    assert_eq!(safest_nodes(&shared.snapshot()), vec![1, 2, 4]);
}

#[test]
fn unparseable_departure_is_an_error() {
    assert!(matches!(
        DepartureTime::parse("half past nine", TZ),
        Err(Error::InvalidTimestamp(_))
    ));
}
