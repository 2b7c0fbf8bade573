//! Copy-on-write holder sharing one `CompactGraph` between concurrent
//! queries and occasional rescoring.
//!
//! Queries work on an `Arc` snapshot and never hold a lock while searching.
//! A rescore copies the score columns (topology stays shared), updates the
//! copy and swaps it in, so a query always sees one consistent version.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::NodeId;
use crate::model::{Business, CompactGraph};
use crate::rescoring::{DepartureTime, RescoreSummary, rescore};
use crate::routing::{PathResult, WeightKind, shortest_path};

/// One immutable version of the shared graph
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub version: u64,
    pub graph: Arc<CompactGraph>,
}

impl std::ops::Deref for GraphSnapshot {
    type Target = CompactGraph;

    fn deref(&self) -> &CompactGraph {
        &self.graph
    }
}

pub struct SharedGraph {
    current: RwLock<GraphSnapshot>,
    /// Serializes writers so concurrent rescores cannot lose updates
    writer: Mutex<()>,
}

impl SharedGraph {
    pub fn new(graph: CompactGraph) -> Self {
        Self {
            current: RwLock::new(GraphSnapshot {
                version: 0,
                graph: Arc::new(graph),
            }),
            writer: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Runs a query on the current snapshot
    pub fn shortest_path(&self, start: NodeId, goal: NodeId, kind: WeightKind) -> PathResult {
        shortest_path(&self.snapshot(), start, goal, kind)
    }

    /// Rescores a copy of the current graph and publishes it as a new version
    pub fn rescore(&self, businesses: &[Business], at: DepartureTime) -> RescoreSummary {
        self.update(|graph| rescore(graph, businesses, at)).1
    }

    /// Applies `f` to a private copy of the current graph and publishes it.
    /// Returns the new version and the result of `f`.
    pub fn update<R>(&self, f: impl FnOnce(&mut CompactGraph) -> R) -> (u64, R) {
        let _writer = self.writer.lock();
        let base = self.snapshot();
        let mut graph = CompactGraph::clone(&base.graph);
        let result = f(&mut graph);

        let version = base.version + 1;
        *self.current.write() = GraphSnapshot {
            version,
            graph: Arc::new(graph),
        };
        log::debug!("Published graph version {version}");
        (version, result)
    }

    /// Replaces the graph outright, e.g. after a rebuild for a new area
    pub fn replace(&self, graph: CompactGraph) -> u64 {
        let _writer = self.writer.lock();
        let mut current = self.current.write();
        current.version += 1;
        current.graph = Arc::new(graph);
        current.version
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::loading::build_compact_graph;
    use crate::model::{AttributedGraph, StreetEdge, StreetNode};
    use crate::scoring::ScoringConfig;

    fn line() -> CompactGraph {
        let mut input = AttributedGraph::new();
        input
            .add_node(StreetNode::new(1, -78.6400, 35.7800))
            .add_node(StreetNode::new(2, -78.6400, 35.7810))
            .add_edge(StreetEdge::new(1, 2, 111.0).with_highway("residential"));
        build_compact_graph(&input, &ScoringConfig::default()).unwrap()
    }

    #[test]
    fn snapshots_survive_rescoring() {
        let shared = SharedGraph::new(line());
        let before = shared.snapshot();
        let business = Business::new(35.7805, -78.6400, "Corner Cafe");

        shared.rescore(&[business], DepartureTime::new(3, 12, 0));
        let after = shared.snapshot();

        assert_eq!(before.version, 0);
        assert_eq!(after.version, 1);
        assert_eq!(before.scores().business, vec![0.5]);
        assert_eq!(after.scores().business, vec![0.9]);
        assert!(before.shares_topology(&after));
    }

    #[test]
    fn concurrent_queries_and_rescores() {
        let shared = Arc::new(SharedGraph::new(line()));
        let business = Business::new(35.7805, -78.6400, "Corner Cafe");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = Arc::clone(&shared);
                let business = business.clone();
                thread::spawn(move || {
                    for hour in 0..20 {
                        if i % 2 == 0 {
                            let at = DepartureTime::new(1, hour, 0);
                            shared.rescore(std::slice::from_ref(&business), at);
                        } else {
                            let snapshot = shared.snapshot();
                            let path = shortest_path(&snapshot, 1, 2, WeightKind::Safest)
                                .into_path()
                                .unwrap();
                            assert_eq!(path.cost, snapshot.weights(WeightKind::Safest)[0]);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // four writers, twenty rescores each, none lost
        assert_eq!(shared.version(), 80);
    }

    #[test]
    fn replace_publishes_new_version() {
        let shared = SharedGraph::new(line());
        let empty = build_compact_graph(&AttributedGraph::new(), &ScoringConfig::default()).unwrap();
        let version = shared.replace(empty);
        assert_eq!(version, 1);
        assert_eq!(shared.snapshot().node_count(), 0);
        assert!(matches!(
            shared.shortest_path(1, 2, WeightKind::Fastest),
            PathResult::NoPath { .. }
        ));
    }
}
