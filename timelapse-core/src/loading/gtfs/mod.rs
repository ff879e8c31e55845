//! Reading stops and shapes from GTFS feeds

mod parser;
mod processor;
mod raw_types;

pub use parser::{deserialize_gtfs_file, deserialize_gtfs_reader};
pub use processor::route_segments_from_gtfs;
pub use raw_types::{FeedShapePoint, FeedStop, FeedTrip};
