//! Indexed, immutable network graph

use std::hash::Hash;

use hashbrown::{Equivalent, HashMap, HashSet, hash_map::Entry};
use log::info;

use super::components::{Edge, Node};
use crate::{EdgeId, Error, NodeId, RouteId, StopId, routing::cache::PathCache};

/// All nodes and edges of one network snapshot.
///
/// Built once and never mutated afterwards, except for the shortest-path
/// cache it owns, which lives exactly as long as the graph does.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    /// Mapping transit stops to the junction serving them
    nodes_by_stop: HashMap<StopId, NodeId>,
    /// Every route carried by at least one edge
    routes: HashSet<RouteId>,
    pub(crate) path_cache: PathCache,
}

impl NetworkGraph {
    /// Builds the graph and its stop index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNetwork`] if ids are duplicated, a stop is
    /// claimed by two nodes, an edge references a missing node, node and
    /// edge incidence disagree, or an edge has a degenerate geometry or
    /// length.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, Error> {
        let mut node_map: HashMap<NodeId, Node> = HashMap::with_capacity(nodes.len());
        let mut nodes_by_stop: HashMap<StopId, NodeId> = HashMap::new();

        for node in nodes {
            for stop_id in &node.stop_ids {
                if let Some(other) = nodes_by_stop.insert(stop_id.clone(), node.id.clone())
                    && other != node.id
                {
                    return Err(Error::InvalidNetwork(format!(
                        "stop {stop_id} is served by both node {other} and node {}",
                        node.id
                    )));
                }
            }

            match node_map.entry(node.id.clone()) {
                Entry::Occupied(entry) => {
                    return Err(Error::InvalidNetwork(format!(
                        "duplicate node id {}",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(node);
                }
            }
        }

        let mut edge_map: HashMap<EdgeId, Edge> = HashMap::with_capacity(edges.len());
        for edge in edges {
            validate_edge(&edge, &node_map)?;
            match edge_map.entry(edge.id.clone()) {
                Entry::Occupied(entry) => {
                    return Err(Error::InvalidNetwork(format!(
                        "duplicate edge id {}",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(edge);
                }
            }
        }

        validate_incidence(&node_map, &edge_map)?;

        let routes: HashSet<RouteId> = edge_map
            .values()
            .flat_map(|edge| edge.route_ids.iter().cloned())
            .collect();

        info!(
            "Created network graph with {} nodes, {} edges, {} stops and {} routes",
            node_map.len(),
            edge_map.len(),
            nodes_by_stop.len(),
            routes.len()
        );

        Ok(Self {
            nodes: node_map,
            edges: edge_map,
            nodes_by_stop,
            routes,
            path_cache: PathCache::default(),
        })
    }

    pub fn node<Q>(&self, id: &Q) -> Option<&Node>
    where
        Q: Hash + Equivalent<NodeId> + ?Sized,
    {
        self.nodes.get(id)
    }

    pub fn edge<Q>(&self, id: &Q) -> Option<&Edge>
    where
        Q: Hash + Equivalent<EdgeId> + ?Sized,
    {
        self.edges.get(id)
    }

    /// Node serving the given stop
    pub fn node_by_stop_id<Q>(&self, stop_id: &Q) -> Option<&Node>
    where
        Q: Hash + Equivalent<StopId> + ?Sized,
    {
        self.nodes_by_stop
            .get(stop_id)
            .and_then(|node_id| self.nodes.get(node_id))
    }

    /// Whether any edge of the network carries `route`
    pub fn has_route<Q>(&self, route: &Q) -> bool
    where
        Q: Hash + Equivalent<RouteId> + ?Sized,
    {
        self.routes.contains(route)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Every known stop together with the node serving it
    pub fn stops(&self) -> impl Iterator<Item = (&StopId, &NodeId)> {
        self.nodes_by_stop.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn stop_count(&self) -> usize {
        self.nodes_by_stop.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

fn validate_edge(edge: &Edge, nodes: &HashMap<NodeId, Node>) -> Result<(), Error> {
    if edge.geometry.0.len() < 2 {
        return Err(Error::InvalidNetwork(format!(
            "edge {} has {} coordinates, at least 2 are required",
            edge.id,
            edge.geometry.0.len()
        )));
    }
    if !edge.length.is_finite() || edge.length < 0.0 {
        return Err(Error::InvalidNetwork(format!(
            "edge {} has invalid length {}",
            edge.id, edge.length
        )));
    }
    for endpoint in [&edge.node_id1, &edge.node_id2] {
        if !nodes.contains_key(endpoint) {
            return Err(Error::InvalidNetwork(format!(
                "edge {} references missing node {endpoint}",
                edge.id
            )));
        }
    }
    Ok(())
}

/// A node lists exactly the edges that reference it
fn validate_incidence(
    nodes: &HashMap<NodeId, Node>,
    edges: &HashMap<EdgeId, Edge>,
) -> Result<(), Error> {
    for node in nodes.values() {
        for edge_id in &node.edge_ids {
            let edge = edges.get(edge_id).ok_or_else(|| {
                Error::InvalidNetwork(format!(
                    "node {} lists missing edge {edge_id}",
                    node.id
                ))
            })?;
            if !edge.is_incident_to(&node.id) {
                return Err(Error::InvalidNetwork(format!(
                    "node {} lists edge {edge_id}, which does not touch it",
                    node.id
                )));
            }
        }
    }

    for edge in edges.values() {
        for endpoint in [&edge.node_id1, &edge.node_id2] {
            // Endpoints were checked in `validate_edge`
            let listed = nodes
                .get(endpoint)
                .is_some_and(|node| node.edge_ids.contains(&edge.id));
            if !listed {
                return Err(Error::InvalidNetwork(format!(
                    "edge {} is missing from the edge list of node {endpoint}",
                    edge.id
                )));
            }
        }
    }
    Ok(())
}
