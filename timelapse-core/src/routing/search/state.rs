use std::cmp::Ordering;

use crate::{Direction, EdgeId, Node};

/// Queue entry: cumulative cost plus the label describing how it was reached
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: f64,
    pub(super) label: usize,
}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost, earlier labels first on ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// One search branch. Labels live in an arena and point at their parent, so
/// a path is materialised only once, when the destination is extracted.
#[derive(Debug)]
pub(super) struct Label<'g> {
    pub(super) node: &'g Node,
    /// Set once the branch has used an edge off the preferred route
    pub(super) left_route: bool,
    pub(super) parent: Option<Step<'g>>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Step<'g> {
    pub(super) label: usize,
    pub(super) edge_id: &'g EdgeId,
    pub(super) direction: Direction,
}
