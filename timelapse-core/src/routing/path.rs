use geo::{Coord, LineString};
use itertools::Either;
use serde::{Deserialize, Serialize};

use crate::{EdgeId, NetworkGraph};

/// Which way an edge is walked relative to its stored geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Vertices of `line` in traversal order
    pub fn walk(self, line: &LineString<f64>) -> impl DoubleEndedIterator<Item = &Coord<f64>> {
        match self {
            Direction::Forward => Either::Left(line.0.iter()),
            Direction::Reverse => Either::Right(line.0.iter().rev()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEdge {
    pub edge_id: EdgeId,
    pub direction: Direction,
}

/// Result of a shortest-path search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Edges in travel order; consecutive edges share a node
    pub edges: Vec<PathEdge>,
    /// Search cost: total edge length plus the route penalty if it applied
    pub cost: f64,
    /// Whether the path runs off the preferred route at some point
    pub left_preferred_route: bool,
}

impl Path {
    /// Path from a node to itself
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            cost: 0.0,
            left_preferred_route: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }
}

impl NetworkGraph {
    /// Physical length of a path in metres, without any penalty.
    ///
    /// # Panics
    ///
    /// If the path references an edge that is not part of this graph
    pub fn path_length(&self, path: &Path) -> f64 {
        path.edges
            .iter()
            .map(|step| self.path_edge(step).length)
            .sum()
    }

    /// Concatenated geometry of a path, oriented in travel order.
    ///
    /// Shared vertices between consecutive edges appear once.
    pub fn path_geometry(&self, path: &Path) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for step in &path.edges {
            let geometry = &self.path_edge(step).geometry;
            for coord in step.direction.walk(geometry) {
                if coords.last() != Some(coord) {
                    coords.push(*coord);
                }
            }
        }
        LineString::new(coords)
    }

    pub(crate) fn path_edge(&self, step: &PathEdge) -> &crate::Edge {
        match self.edge(&step.edge_id) {
            Some(edge) => edge,
            None => panic!("path references edge {} outside the graph", step.edge_id),
        }
    }
}
