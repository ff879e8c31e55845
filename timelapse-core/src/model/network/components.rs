//! Network graph components - nodes and edges

use geo::{LineString, Point};
use hashbrown::HashSet;

use crate::{EdgeId, NodeId, RouteId, StopId};

/// Network junction, optionally serving one or more transit stops
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Node coordinates (lon, lat)
    pub point: Point<f64>,
    /// Edges incident to this node
    pub edge_ids: Vec<EdgeId>,
    /// Stops located at this junction, possibly none
    pub stop_ids: Vec<StopId>,
}

impl Node {
    pub fn has_stops(&self) -> bool {
        !self.stop_ids.is_empty()
    }
}

/// Physical track or road segment between two nodes
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    /// Physical shape, starting at `node_id1` and ending at `node_id2`
    pub geometry: LineString<f64>,
    pub node_id1: NodeId,
    pub node_id2: NodeId,
    /// Length in metres
    pub length: f64,
    /// Routes running over this segment
    pub route_ids: HashSet<RouteId>,
}

impl Edge {
    pub fn serves_route(&self, route: &RouteId) -> bool {
        self.route_ids.contains(route)
    }

    /// The endpoint across the edge from `node`.
    ///
    /// For self-loops this is `node` itself.
    pub fn opposite(&self, node: &NodeId) -> &NodeId {
        if &self.node_id1 == node {
            &self.node_id2
        } else {
            &self.node_id1
        }
    }

    pub fn is_incident_to(&self, node: &NodeId) -> bool {
        &self.node_id1 == node || &self.node_id2 == node
    }
}
