//! Turning overlapping shape polylines into a deduplicated network.
//!
//! Every shape is split into two-point edges keyed by their exact
//! coordinates, so shapes that share track share edges and accumulate each
//! other's routes. Chains of junctions that serve no stop and only connect
//! two edges carrying the same routes are then merged away.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use geo::{Coord, Distance, Haversine, Point};
use hashbrown::HashMap;
use log::{info, warn};
use rayon::prelude::*;

use crate::model::{EdgeDocument, LineStringGeometry, NetworkDocument, NodeDocument, PointGeometry};
use crate::{EdgeId, NodeId, RouteId, StopId};

/// A shape polyline in `[lon, lat]` order with the routes running along it
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub points: Vec<Coord<f64>>,
    pub routes: BTreeSet<RouteId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopLocation {
    pub stop_id: StopId,
    pub point: Coord<f64>,
}

/// Exact identity of a coordinate. `-0.0` and `0.0` share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct PointKey(u64, u64);

impl From<Coord<f64>> for PointKey {
    fn from(point: Coord<f64>) -> Self {
        Self((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
    }
}

#[derive(Debug)]
struct BuilderNode {
    point: Coord<f64>,
    stop_ids: BTreeSet<StopId>,
    /// Indices into `RouteGraphBuilder::edges`, without repeats
    edges: Vec<usize>,
}

#[derive(Debug)]
struct BuilderEdge {
    points: Vec<Coord<f64>>,
    routes: BTreeSet<RouteId>,
}

impl BuilderEdge {
    fn start(&self) -> PointKey {
        PointKey::from(self.points[0])
    }

    fn end(&self) -> PointKey {
        PointKey::from(self.points[self.points.len() - 1])
    }

    fn is_loop(&self) -> bool {
        self.start() == self.end()
    }
}

#[derive(Debug, Default)]
pub struct RouteGraphBuilder {
    nodes: BTreeMap<PointKey, BuilderNode>,
    /// Merged-away edges leave a `None` behind so indices stay stable
    edges: Vec<Option<BuilderEdge>>,
    edges_by_points: HashMap<Vec<PointKey>, usize>,
    stop_nodes: HashMap<StopId, PointKey>,
}

impl RouteGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Places a stop on the junction at its location, creating the junction
    /// if no shape passes through it.
    pub fn add_stop(&mut self, stop: StopLocation) {
        let key = PointKey::from(stop.point);
        match self.stop_nodes.get(&stop.stop_id) {
            Some(existing) if *existing != key => {
                warn!(
                    "Stop {} appears at two locations, keeping the first",
                    stop.stop_id
                );
                return;
            }
            Some(_) => return,
            None => {}
        }
        self.stop_nodes.insert(stop.stop_id.clone(), key);
        self.node_at(stop.point).stop_ids.insert(stop.stop_id);
    }

    /// Splits a shape into two-point edges, merging routes into any edge
    /// that already covers the same pair of points.
    pub fn add_segment(&mut self, segment: &RouteSegment) {
        for pair in segment.points.windows(2) {
            if PointKey::from(pair[0]) == PointKey::from(pair[1]) {
                continue;
            }
            self.insert_edge(pair.to_vec(), segment.routes.clone());
        }
    }

    /// Merges junctions that have no stops and exactly two edges carrying
    /// identical routes. Returns the number of junctions removed.
    ///
    /// A single pass reaches a fixed point: running it again removes nothing.
    pub fn coalesce(&mut self) -> usize {
        let keys: Vec<PointKey> = self.nodes.keys().copied().collect();
        let removed = keys
            .into_iter()
            .filter(|key| self.coalesce_node(*key))
            .count();

        info!(
            "Coalesced {removed} junctions, {} nodes and {} edges remain",
            self.node_count(),
            self.edge_count()
        );
        removed
    }

    fn coalesce_node(&mut self, key: PointKey) -> bool {
        let Some(node) = self.nodes.get(&key) else {
            return false;
        };
        let &[first, second] = node.edges.as_slice() else {
            return false;
        };
        if !node.stop_ids.is_empty() {
            return false;
        }
        let (Some(a), Some(b)) = (&self.edges[first], &self.edges[second]) else {
            return false;
        };
        if a.is_loop() || b.is_loop() || a.routes != b.routes {
            return false;
        }

        // Orient so the merged line runs through the junction
        let mut points = a.points.clone();
        if a.end() != key {
            points.reverse();
        }
        let mut tail = b.points.clone();
        if b.start() != key {
            tail.reverse();
        }
        points.extend(tail.into_iter().skip(1));
        let routes = a.routes.clone();

        for idx in [first, second] {
            if let Some(edge) = self.edges[idx].take() {
                let keys = edge.points.iter().copied().map(PointKey::from).collect::<Vec<_>>();
                self.edges_by_points.remove(&keys);
            }
        }
        for end in [PointKey::from(points[0]), PointKey::from(points[points.len() - 1])] {
            if let Some(neighbour) = self.nodes.get_mut(&end) {
                neighbour.edges.retain(|idx| *idx != first && *idx != second);
            }
        }
        self.nodes.remove(&key);

        self.insert_edge(points, routes);
        true
    }

    fn insert_edge(&mut self, mut points: Vec<Coord<f64>>, routes: BTreeSet<RouteId>) {
        normalize(&mut points);
        let keys = points.iter().copied().map(PointKey::from).collect::<Vec<_>>();

        if let Some(&idx) = self.edges_by_points.get(&keys)
            && let Some(edge) = self.edges[idx].as_mut()
        {
            edge.routes.extend(routes);
            return;
        }

        let idx = self.edges.len();
        for point in [points[0], points[points.len() - 1]] {
            let node = self.node_at(point);
            if !node.edges.contains(&idx) {
                node.edges.push(idx);
            }
        }
        self.edges.push(Some(BuilderEdge { points, routes }));
        self.edges_by_points.insert(keys, idx);
    }

    fn node_at(&mut self, point: Coord<f64>) -> &mut BuilderNode {
        self.nodes
            .entry(PointKey::from(point))
            .or_insert_with(|| BuilderNode {
                point,
                stop_ids: BTreeSet::new(),
                edges: Vec::new(),
            })
    }

    /// Assigns ids and measures edges, producing the serializable network.
    ///
    /// Node ids are `1..=N` in coordinate order and edge ids continue the
    /// same sequence. An edge's first node is the one at its first point.
    pub fn into_document(self) -> NetworkDocument {
        let mut next_id = 1usize;
        let mut fresh_id = || {
            let id = next_id.to_string();
            next_id += 1;
            id
        };

        let node_ids: HashMap<PointKey, NodeId> = self
            .nodes
            .keys()
            .map(|key| (*key, NodeId::from(fresh_id())))
            .collect();

        let edges: Vec<(usize, BuilderEdge)> = self
            .edges
            .into_iter()
            .enumerate()
            .filter_map(|(idx, edge)| edge.map(|edge| (idx, edge)))
            .collect();
        let edge_ids: HashMap<usize, EdgeId> = edges
            .iter()
            .map(|(idx, _)| (*idx, EdgeId::from(fresh_id())))
            .collect();

        let lengths: Vec<f64> = edges
            .par_iter()
            .map(|(_, edge)| haversine_length(&edge.points))
            .collect();

        let mut disconnected = 0usize;
        let nodes = self
            .nodes
            .into_iter()
            .map(|(key, node)| {
                if node.edges.is_empty() && !node.stop_ids.is_empty() {
                    disconnected += 1;
                }
                let id = node_ids[&key].clone();
                let document = NodeDocument {
                    id: id.clone(),
                    point: PointGeometry::from(Point::from(node.point)),
                    edge_ids: node.edges.iter().map(|idx| edge_ids[idx].clone()).collect(),
                    stop_ids: (!node.stop_ids.is_empty())
                        .then(|| node.stop_ids.into_iter().collect()),
                };
                (id, document)
            })
            .collect::<BTreeMap<_, _>>();

        let edges = edges
            .into_iter()
            .zip(lengths)
            .map(|((idx, edge), length)| {
                let id = edge_ids[&idx].clone();
                let document = EdgeDocument {
                    id: id.clone(),
                    node_id1: node_ids[&edge.start()].clone(),
                    node_id2: node_ids[&edge.end()].clone(),
                    linestring: LineStringGeometry::LineString {
                        coordinates: edge.points.iter().map(|c| [c.x, c.y]).collect(),
                    },
                    length,
                    route_ids: (!edge.routes.is_empty())
                        .then(|| edge.routes.into_iter().collect()),
                };
                (id, document)
            })
            .collect::<BTreeMap<_, _>>();

        if disconnected > 0 {
            warn!("{disconnected} stop junctions are not connected to any shape");
        }
        info!(
            "Built network document with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );

        NetworkDocument { nodes, edges }
    }
}

/// Stores a line in whichever direction compares lower, so the same track
/// digitized in either direction produces the same key.
fn normalize(points: &mut [Coord<f64>]) {
    let reversed_is_lower = points
        .iter()
        .rev()
        .zip(points.iter())
        .map(|(backward, forward)| compare_coords(backward, forward))
        .find(|ordering| *ordering != Ordering::Equal)
        == Some(Ordering::Less);
    if reversed_is_lower {
        points.reverse();
    }
}

fn compare_coords(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Length in metres along the surface of the earth
fn haversine_length(points: &[Coord<f64>]) -> f64 {
    points
        .windows(2)
        .map(|pair| Haversine.distance(Point::from(pair[0]), Point::from(pair[1])))
        .sum()
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;
    use crate::{NetworkGraph, StopId};

    fn segment(points: &[(f64, f64)], routes: &[&str]) -> RouteSegment {
        RouteSegment {
            points: points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect(),
            routes: routes.iter().copied().map(RouteId::new).collect(),
        }
    }

    fn stop(id: &str, x: f64, y: f64) -> StopLocation {
        StopLocation {
            stop_id: StopId::new(id),
            point: coord! { x: x, y: y },
        }
    }

    #[test]
    fn test_shared_track_merges_routes() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_segment(&segment(&[(0.0, 0.0), (0.0, 0.01)], &["1"]));
        // Same track digitized the other way round
        builder.add_segment(&segment(&[(0.0, 0.01), (0.0, 0.0)], &["2"]));

        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);

        let document = builder.into_document();
        let edge = document.edges.values().next().unwrap();
        assert_eq!(
            edge.route_ids,
            Some(vec![RouteId::new("1"), RouteId::new("2")])
        );
        assert_eq!(edge.node_id1.as_str(), "1");
        // One hundredth of a degree of latitude is a little over a kilometre
        assert!((1100.0..1120.0).contains(&edge.length), "{}", edge.length);
    }

    #[test]
    fn test_pass_through_junction_is_coalesced() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_stop(stop("A", 0.0, 0.0));
        builder.add_stop(stop("C", 0.02, 0.0));
        builder.add_segment(&segment(&[(0.0, 0.0), (0.01, 0.0), (0.02, 0.0)], &["1"]));

        assert_eq!(builder.coalesce(), 1);
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);

        let document = builder.into_document();
        let edge = document.edges.values().next().unwrap();
        let LineStringGeometry::LineString { coordinates } = &edge.linestring;
        assert_eq!(coordinates, &vec![[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]]);
    }

    #[test]
    fn test_stop_junction_is_kept() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_stop(stop("B", 0.01, 0.0));
        builder.add_segment(&segment(&[(0.0, 0.0), (0.01, 0.0), (0.02, 0.0)], &["1"]));

        assert_eq!(builder.coalesce(), 0);
        assert_eq!(builder.edge_count(), 2);
    }

    #[test]
    fn test_junction_between_different_routes_is_kept() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_segment(&segment(&[(0.0, 0.0), (0.01, 0.0)], &["1"]));
        builder.add_segment(&segment(&[(0.01, 0.0), (0.02, 0.0)], &["1", "2"]));

        assert_eq!(builder.coalesce(), 0);
        assert_eq!(builder.node_count(), 3);
    }

    #[test]
    fn test_second_coalesce_is_a_no_op() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_stop(stop("A", 0.0, 0.0));
        builder.add_stop(stop("D", 0.03, 0.01));
        builder.add_segment(&segment(
            &[(0.0, 0.0), (0.01, 0.0), (0.02, 0.0), (0.03, 0.0), (0.03, 0.01)],
            &["1"],
        ));
        // Branch line leaving the trunk at (0.02, 0.0)
        builder.add_segment(&segment(&[(0.02, 0.0), (0.02, -0.01), (0.02, -0.02)], &["2"]));

        let first = builder.coalesce();
        assert!(first > 0);
        let nodes = builder.node_count();
        let edges = builder.edge_count();

        assert_eq!(builder.coalesce(), 0);
        assert_eq!(builder.node_count(), nodes);
        assert_eq!(builder.edge_count(), edges);
    }

    #[test]
    fn test_document_builds_a_valid_graph() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_stop(stop("A", 0.0, 0.0));
        builder.add_stop(stop("C", 0.02, 0.0));
        builder.add_stop(stop("lonely", 1.0, 1.0));
        builder.add_segment(&segment(&[(0.0, 0.0), (0.01, 0.0), (0.02, 0.0)], &["1"]));
        builder.add_segment(&segment(&[(0.02, 0.0), (0.02, 0.01)], &["2"]));
        builder.coalesce();

        let mut graph = NetworkGraph::from_document(builder.into_document()).unwrap();
        assert_eq!(graph.stop_count(), 3);

        let path = graph
            .shortest_path(&StopId::new("A"), &StopId::new("C"), &RouteId::new("1"))
            .unwrap();
        assert_eq!(path.len(), 1);
        assert!(!path.left_preferred_route);

        let unreachable =
            graph.shortest_path(&StopId::new("A"), &StopId::new("lonely"), &RouteId::new("1"));
        assert!(unreachable.is_none());
    }

    #[test]
    fn test_stop_at_second_location_is_ignored() {
        let mut builder = RouteGraphBuilder::new();
        builder.add_stop(stop("A", 0.0, 0.0));
        builder.add_stop(stop("A", 0.5, 0.5));

        assert_eq!(builder.node_count(), 1);
    }
}
