use std::cmp::Ordering;

use crate::NodeIdx;

/// Heap entry of the search frontier
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: f64,
    pub(super) node: NodeIdx,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Min-heap by cost (reversed from standard Rust BinaryHeap), ties by node
// index so pops are deterministic
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
