pub use crate::ROUTE_LEAVE_PENALTY;

// Network model and loading
pub use crate::loading::{
    NetworkConfig, RouteGraphBuilder, create_network_document, create_network_graph,
};
pub use crate::model::{Edge, NetworkDocument, NetworkGraph, Node};

// Routing and interpolation
pub use crate::interpolation::{Projection, interpolate_line};
pub use crate::routing::{CacheStats, Direction, Path, PathEdge};

// Vehicle tracks
pub use crate::animation::{TripSchedule, VehiclePosition, VehicleTrack, positions_at};

// Identifiers
pub use crate::{EdgeId, NodeId, RouteId, StopId, TripId};

pub use crate::Error;
