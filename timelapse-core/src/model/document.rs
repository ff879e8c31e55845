//! JSON network description, as served to rendering clients.
//!
//! Nodes and edges are keyed by id. Geometries use the GeoJSON `Point` and
//! `LineString` shapes with `[lon, lat]` coordinate pairs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path as FsPath;

use geo::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use super::network::{Edge, NetworkGraph, Node};
use crate::{EdgeId, Error, NodeId, RouteId, StopId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub nodes: BTreeMap<NodeId, NodeDocument>,
    pub edges: BTreeMap<EdgeId, EdgeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: NodeId,
    pub point: PointGeometry,
    #[serde(rename = "edgeIDs")]
    pub edge_ids: Vec<EdgeId>,
    /// `null` when the junction serves no stop
    #[serde(rename = "stopIDs", default)]
    pub stop_ids: Option<Vec<StopId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub id: EdgeId,
    pub linestring: LineStringGeometry,
    #[serde(rename = "nodeID1")]
    pub node_id1: NodeId,
    #[serde(rename = "nodeID2")]
    pub node_id2: NodeId,
    pub length: f64,
    #[serde(rename = "routeIDs", default)]
    pub route_ids: Option<Vec<RouteId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointGeometry {
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LineStringGeometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

impl From<PointGeometry> for Point<f64> {
    fn from(geometry: PointGeometry) -> Self {
        let PointGeometry::Point {
            coordinates: [x, y],
        } = geometry;
        Point::new(x, y)
    }
}

impl From<Point<f64>> for PointGeometry {
    fn from(point: Point<f64>) -> Self {
        PointGeometry::Point {
            coordinates: [point.x(), point.y()],
        }
    }
}

impl From<LineStringGeometry> for LineString<f64> {
    fn from(geometry: LineStringGeometry) -> Self {
        let LineStringGeometry::LineString { coordinates } = geometry;
        coordinates
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect()
    }
}

impl From<&LineString<f64>> for LineStringGeometry {
    fn from(line: &LineString<f64>) -> Self {
        LineStringGeometry::LineString {
            coordinates: line.coords().map(|c| [c.x, c.y]).collect(),
        }
    }
}

impl NetworkDocument {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    pub fn from_path(path: &FsPath) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to open network '{}': {}", path.display(), e),
            )
        })?;
        Self::from_reader(file)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Splits the document into typed graph entities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNetwork`] if a map key disagrees with the id
    /// stored in its value.
    pub fn into_entities(self) -> Result<(Vec<Node>, Vec<Edge>), Error> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|(key, node)| {
                if key != node.id {
                    return Err(Error::InvalidNetwork(format!(
                        "node keyed as {key} carries id {}",
                        node.id
                    )));
                }
                Ok(Node {
                    id: node.id,
                    point: node.point.into(),
                    edge_ids: node.edge_ids,
                    stop_ids: node.stop_ids.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|(key, edge)| {
                if key != edge.id {
                    return Err(Error::InvalidNetwork(format!(
                        "edge keyed as {key} carries id {}",
                        edge.id
                    )));
                }
                Ok(Edge {
                    id: edge.id,
                    geometry: edge.linestring.into(),
                    node_id1: edge.node_id1,
                    node_id2: edge.node_id2,
                    length: edge.length,
                    route_ids: edge.route_ids.unwrap_or_default().into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((nodes, edges))
    }
}

impl NetworkGraph {
    /// Decodes and validates a network description.
    pub fn from_document(document: NetworkDocument) -> Result<Self, Error> {
        let (nodes, edges) = document.into_entities()?;
        Self::new(nodes, edges)
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Self::from_document(NetworkDocument::from_json_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Self::from_document(NetworkDocument::from_reader(reader)?)
    }

    pub fn from_path(path: &FsPath) -> Result<Self, Error> {
        Self::from_document(NetworkDocument::from_path(path)?)
    }

    /// Serialisable description of this graph, the inverse of
    /// [`NetworkGraph::from_document`].
    pub fn to_document(&self) -> NetworkDocument {
        let nodes = self
            .nodes()
            .map(|node| {
                let mut stop_ids = node.stop_ids.clone();
                stop_ids.sort();
                let document = NodeDocument {
                    id: node.id.clone(),
                    point: node.point.into(),
                    edge_ids: node.edge_ids.clone(),
                    stop_ids: (!stop_ids.is_empty()).then_some(stop_ids),
                };
                (node.id.clone(), document)
            })
            .collect();

        let edges = self
            .edges()
            .map(|edge| {
                let mut route_ids: Vec<RouteId> = edge.route_ids.iter().cloned().collect();
                route_ids.sort();
                let document = EdgeDocument {
                    id: edge.id.clone(),
                    linestring: (&edge.geometry).into(),
                    node_id1: edge.node_id1.clone(),
                    node_id2: edge.node_id2.clone(),
                    length: edge.length,
                    route_ids: Some(route_ids),
                };
                (edge.id.clone(), document)
            })
            .collect();

        NetworkDocument { nodes, edges }
    }
}
