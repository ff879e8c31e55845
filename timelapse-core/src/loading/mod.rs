//! This module is responsible for loading a network from GTFS feeds: reading
//! shapes and stops, deduplicating shared track and producing the network
//! document served to clients.

mod builder;
mod config;
pub mod gtfs;
pub mod route_graph;

pub use builder::{create_network_document, create_network_graph};
pub use config::NetworkConfig;
pub use route_graph::{RouteGraphBuilder, RouteSegment, StopLocation};
