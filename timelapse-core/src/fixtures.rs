//! Small hand-built networks for unit tests

use geo::{Coord, LineString, Point};
use hashbrown::HashSet;

use crate::{Edge, EdgeId, NetworkGraph, Node, NodeId, Projection, RouteId, StopId};

#[derive(Default)]
pub(crate) struct GraphFixture {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node(mut self, id: &str, x: f64, y: f64, stops: &[&str]) -> Self {
        self.nodes.push(Node {
            id: NodeId::new(id),
            point: Point::new(x, y),
            edge_ids: Vec::new(),
            stop_ids: stops.iter().copied().map(StopId::new).collect(),
        });
        self
    }

    /// Straight edge between two existing nodes
    pub(crate) fn edge(self, id: &str, from: &str, to: &str, length: f64, routes: &[&str]) -> Self {
        let start = self.point_of(from);
        let end = self.point_of(to);
        self.edge_along(id, from, to, vec![start, end], length, routes)
    }

    /// Edge following `coords`, which should start at `from` and end at `to`
    pub(crate) fn edge_along(
        mut self,
        id: &str,
        from: &str,
        to: &str,
        coords: Vec<Coord<f64>>,
        length: f64,
        routes: &[&str],
    ) -> Self {
        let edge_id = EdgeId::new(id);
        for node in self
            .nodes
            .iter_mut()
            .filter(|node| node.id.as_str() == from || node.id.as_str() == to)
        {
            node.edge_ids.push(edge_id.clone());
        }
        self.edges.push(Edge {
            id: edge_id,
            geometry: LineString::new(coords),
            node_id1: NodeId::new(from),
            node_id2: NodeId::new(to),
            length,
            route_ids: routes.iter().copied().map(RouteId::new).collect::<HashSet<_>>(),
        });
        self
    }

    pub(crate) fn build(self) -> NetworkGraph {
        NetworkGraph::new(self.nodes, self.edges).expect("fixture network must be valid")
    }

    fn point_of(&self, id: &str) -> Coord<f64> {
        self.nodes
            .iter()
            .find(|node| node.id.as_str() == id)
            .map(|node| node.point.into())
            .expect("fixture edge must reference a declared node")
    }
}

/// Treats geographic coordinates as planar
pub(crate) struct Identity;

impl Projection for Identity {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        coord
    }

    fn invert(&self, coord: Coord<f64>) -> Coord<f64> {
        coord
    }
}

/// Spherical Mercator in radians; distorts distances away from the equator
pub(crate) struct Mercator;

impl Projection for Mercator {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let lat = coord.y.to_radians();
        Coord {
            x: coord.x.to_radians(),
            y: (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
        }
    }

    fn invert(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x.to_degrees(),
            y: (2.0 * coord.y.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees(),
        }
    }
}
