//! Route-biased shortest paths between stops

pub mod cache;
pub mod path;
pub mod search;
mod to_geojson;

pub use cache::{CacheStats, PathKey};
pub use path::{Direction, Path, PathEdge};
