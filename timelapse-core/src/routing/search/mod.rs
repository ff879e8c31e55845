//! Best-first search preferring one route.
//!
//! Leaving the preferred route costs [`ROUTE_LEAVE_PENALTY`] once per path;
//! after that the branch may use any edge without further penalty. Nodes are
//! finalized on first extraction, which is only exact because the penalty
//! dominates every real path length.

mod state;

use std::collections::BinaryHeap;
use std::sync::Arc;

use hashbrown::HashSet;
use log::{debug, warn};

use self::state::{Label, State, Step};
use super::{CacheStats, Direction, Path, PathEdge, PathKey};
use crate::{NetworkGraph, Node, NodeId, ROUTE_LEAVE_PENALTY, RouteId, StopId};

impl NetworkGraph {
    /// Best path between two stops, biased towards `route`.
    ///
    /// Results, including `None`, are memoized per `(start, end, route)` for
    /// the lifetime of the graph. A stop paired with itself, or with another
    /// stop at the same node, yields an empty path of cost zero.
    pub fn shortest_path(
        &mut self,
        start: &StopId,
        end: &StopId,
        route: &RouteId,
    ) -> Option<Arc<Path>> {
        let key = PathKey {
            start: start.clone(),
            end: end.clone(),
            route: route.clone(),
        };
        if let Some(cached) = self.path_cache.lookup(&key) {
            return cached;
        }

        let found = self.find_path(start, end, route).map(Arc::new);
        self.path_cache.store(key, found.clone());
        found
    }

    /// Uncached search behind [`NetworkGraph::shortest_path`]
    pub fn find_path(&self, start: &StopId, end: &StopId, route: &RouteId) -> Option<Path> {
        let (Some(from), Some(to)) = (self.node_by_stop_id(start), self.node_by_stop_id(end))
        else {
            warn!("Path requested between unknown stops {start} -> {end}");
            return None;
        };

        let path = route_biased_search(self, from, to, route);
        match &path {
            Some(path) => debug!(
                "Found path {start} -> {end} on route {route}: {} edges, cost {:.1}",
                path.len(),
                path.cost
            ),
            None => warn!("No path found from {start} to {end} (preferred route {route})"),
        }
        path
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.path_cache.stats()
    }

    /// Number of memoized `(start, end, route)` queries
    pub fn cached_path_count(&self) -> usize {
        self.path_cache.len()
    }
}

fn route_biased_search<'g>(
    graph: &'g NetworkGraph,
    start: &'g Node,
    target: &'g Node,
    route: &RouteId,
) -> Option<Path> {
    let mut labels: Vec<Label<'g>> = vec![Label {
        node: start,
        left_route: false,
        parent: None,
    }];
    let mut finalized: HashSet<&NodeId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    heap.push(State {
        cost: 0.0,
        label: 0,
    });

    while let Some(State { cost, label }) = heap.pop() {
        let node = labels[label].node;
        let left_route = labels[label].left_route;

        if node.id == target.id {
            return Some(reconstruct_path(&labels, label, cost));
        }

        // A cheaper entry already finalized this node
        if !finalized.insert(&node.id) {
            continue;
        }

        for edge_id in &node.edge_ids {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            let next_id = edge.opposite(&node.id);
            let direction = if edge.node_id1 == node.id {
                Direction::Forward
            } else {
                Direction::Reverse
            };
            if finalized.contains(next_id) {
                continue;
            }
            let Some(next) = graph.node(next_id) else {
                continue;
            };

            let mut next_cost = cost + edge.length;
            let mut next_left_route = left_route;
            if !left_route && !edge.serves_route(route) {
                next_cost += ROUTE_LEAVE_PENALTY;
                next_left_route = true;
            }

            labels.push(Label {
                node: next,
                left_route: next_left_route,
                parent: Some(Step {
                    label,
                    edge_id: &edge.id,
                    direction,
                }),
            });
            heap.push(State {
                cost: next_cost,
                label: labels.len() - 1,
            });
        }
    }

    None
}

fn reconstruct_path(labels: &[Label<'_>], last: usize, cost: f64) -> Path {
    let mut edges = Vec::new();
    let mut current = labels[last].parent;
    while let Some(step) = current {
        edges.push(PathEdge {
            edge_id: step.edge_id.clone(),
            direction: step.direction,
        });
        current = labels[step.label].parent;
    }
    edges.reverse();

    Path {
        edges,
        cost,
        left_preferred_route: labels[last].left_route,
    }
}
