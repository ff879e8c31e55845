use std::path::PathBuf;

/// Inputs for building a network from GTFS shapes
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Directories containing `stops.txt`, `shapes.txt` and `trips.txt`
    pub gtfs_dirs: Vec<PathBuf>,
    /// Merge pass-through junctions whose two edges carry the same routes
    pub coalesce: bool,
}

impl NetworkConfig {
    pub fn new(gtfs_dirs: Vec<PathBuf>) -> Self {
        Self {
            gtfs_dirs,
            coalesce: true,
        }
    }
}
