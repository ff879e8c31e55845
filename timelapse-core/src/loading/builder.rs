use log::info;

use super::config::NetworkConfig;
use super::gtfs::route_segments_from_gtfs;
use super::route_graph::RouteGraphBuilder;
use crate::{Error, NetworkDocument, NetworkGraph};

/// Builds the network document from the GTFS feeds named in `config`
///
/// # Errors
///
/// Returns an error if the configuration is unusable or a feed file cannot
/// be read
pub fn create_network_document(config: &NetworkConfig) -> Result<NetworkDocument, Error> {
    validate_config(config)?;

    let (stops, segments) = route_segments_from_gtfs(config)?;

    let mut builder = RouteGraphBuilder::new();
    for segment in &segments {
        builder.add_segment(segment);
    }
    info!(
        "Deduplicated {} shape segments into {} edges",
        segments.len(),
        builder.edge_count()
    );
    drop(segments);

    for stop in stops {
        builder.add_stop(stop);
    }
    if config.coalesce {
        builder.coalesce();
    }

    Ok(builder.into_document())
}

/// Builds the document from GTFS and indexes it as a routable graph
///
/// # Errors
///
/// Returns an error if loading fails or the produced network is invalid
pub fn create_network_graph(config: &NetworkConfig) -> Result<NetworkGraph, Error> {
    let document = create_network_document(config)?;
    let graph = NetworkGraph::from_document(document)?;
    info!("Network graph created successfully");
    Ok(graph)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    if config.gtfs_dirs.is_empty() {
        return Err(Error::InvalidData(
            "At least one GTFS directory is required".to_string(),
        ));
    }
    for dir in &config.gtfs_dirs {
        if !dir.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("GTFS directory not found: {}", dir.display()),
            )));
        }
    }
    Ok(())
}
