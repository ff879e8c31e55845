//! Pathfinding and interpolation engine for animating transit vehicles
//! over a rail/bus network.
//!
//! A [`NetworkGraph`] is built once per network snapshot. For every pair of
//! consecutive stops a vehicle visits, [`NetworkGraph::shortest_path`] finds a
//! physical route biased towards the vehicle's own line, and
//! [`NetworkGraph::interpolate_path`] turns that route plus a travel fraction
//! into a point on the map.

pub mod animation;
pub mod error;
pub mod identifiers;
pub mod interpolation;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

#[cfg(test)]
mod fixtures;

pub use error::Error;
pub use identifiers::{EdgeId, NodeId, RouteId, StopId, TripId};
pub use interpolation::{Projection, interpolate_line};
pub use loading::{NetworkConfig, create_network_document, create_network_graph};
pub use model::{Edge, NetworkDocument, NetworkGraph, Node};
pub use routing::{CacheStats, Direction, Path, PathEdge};

/// Cost added the first time a path leaves the preferred route.
///
/// Must dominate the length (in metres) of any real path through the
/// network, otherwise visited-set pruning in the search is unsound.
pub const ROUTE_LEAVE_PENALTY: f64 = 1.0e9;
