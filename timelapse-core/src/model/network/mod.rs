//! Transit network graph

pub mod components;
pub mod graph;
mod to_geojson;

pub use components::{Edge, Node};
pub use graph::NetworkGraph;
