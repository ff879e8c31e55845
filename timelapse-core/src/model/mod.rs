//! Data model of the transit network
//!
//! Contains the typed graph entities and the JSON network description they
//! are decoded from.

pub mod document;
pub mod network;

pub use document::{EdgeDocument, LineStringGeometry, NetworkDocument, NodeDocument, PointGeometry};
pub use network::{Edge, NetworkGraph, Node};
