use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use geo::{Coord, coord};
use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};

use super::{
    parser::{deserialize_gtfs_file, parse_coordinate},
    raw_types::{FeedShapePoint, FeedStop, FeedTrip},
};
use crate::loading::config::NetworkConfig;
use crate::loading::route_graph::{RouteSegment, StopLocation};
use crate::{Error, RouteId, StopId};

/// Read stop locations and route-tagged shape polylines from every feed
/// directory in `config`.
pub fn route_segments_from_gtfs(
    config: &NetworkConfig,
) -> Result<(Vec<StopLocation>, Vec<RouteSegment>), Error> {
    let mut stops = Vec::new();
    let mut segments = Vec::new();

    for dir in &config.gtfs_dirs {
        info!("Reading GTFS shapes from {}", dir.display());
        let feed_stops: Vec<FeedStop> = deserialize_gtfs_file(&dir.join("stops.txt"))?;
        let feed_trips: Vec<FeedTrip> = deserialize_gtfs_file(&dir.join("trips.txt"))?;
        let feed_shapes: Vec<FeedShapePoint> = deserialize_gtfs_file(&dir.join("shapes.txt"))?;

        stops.extend(stop_locations(feed_stops, dir));
        segments.extend(shape_segments(&feed_trips, feed_shapes, dir));
    }

    info!(
        "Loaded {} stops and {} shape segments",
        stops.len(),
        segments.len()
    );
    Ok((stops, segments))
}

pub(crate) fn stop_locations(feed_stops: Vec<FeedStop>, source: &Path) -> Vec<StopLocation> {
    let total = feed_stops.len();
    let locations = feed_stops
        .into_iter()
        .filter_map(|stop| {
            let lat = parse_coordinate(&stop.stop_lat)?;
            let lon = parse_coordinate(&stop.stop_lon)?;
            (!stop.stop_id.is_empty()).then(|| StopLocation {
                stop_id: StopId::from(stop.stop_id),
                point: coord! { x: lon, y: lat },
            })
        })
        .collect::<Vec<_>>();

    if locations.len() < total {
        warn!(
            "{} stops in {} have no usable location and were skipped",
            total - locations.len(),
            source.display()
        );
    }
    locations
}

pub(crate) fn shape_segments(
    feed_trips: &[FeedTrip],
    feed_shapes: Vec<FeedShapePoint>,
    source: &Path,
) -> Vec<RouteSegment> {
    let mut routes_by_shape: HashMap<&str, BTreeSet<RouteId>> = HashMap::new();
    for trip in feed_trips {
        if trip.shape_id.is_empty() || trip.route_id.is_empty() {
            continue;
        }
        routes_by_shape
            .entry(trip.shape_id.as_str())
            .or_default()
            .insert(RouteId::new(&trip.route_id));
    }

    // Ordered so that the produced network is stable between runs
    let mut points_by_shape: BTreeMap<String, Vec<(u32, Coord<f64>)>> = BTreeMap::new();
    let mut malformed = 0usize;
    for point in feed_shapes {
        let parsed = (
            point.shape_pt_sequence.trim().parse::<u32>().ok(),
            parse_coordinate(&point.shape_pt_lat),
            parse_coordinate(&point.shape_pt_lon),
        );
        let (Some(sequence), Some(lat), Some(lon)) = parsed else {
            malformed += 1;
            continue;
        };
        points_by_shape
            .entry(point.shape_id)
            .or_default()
            .push((sequence, coord! { x: lon, y: lat }));
    }
    if malformed > 0 {
        warn!(
            "{malformed} shape points in {} could not be parsed and were skipped",
            source.display()
        );
    }

    let mut unused_shapes = 0usize;
    let segments = points_by_shape
        .into_iter()
        .filter_map(|(shape_id, mut points)| {
            let Some(routes) = routes_by_shape.get(shape_id.as_str()) else {
                unused_shapes += 1;
                return None;
            };
            points.sort_by_key(|(sequence, _)| *sequence);
            let points = points
                .into_iter()
                .map(|(_, point)| point)
                .dedup()
                .collect::<Vec<_>>();
            (points.len() >= 2).then(|| RouteSegment {
                points,
                routes: routes.clone(),
            })
        })
        .collect::<Vec<_>>();

    if unused_shapes > 0 {
        warn!(
            "{unused_shapes} shapes in {} are not referenced by any trip",
            source.display()
        );
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_point(shape_id: &str, lat: &str, lon: &str, sequence: &str) -> FeedShapePoint {
        FeedShapePoint {
            shape_id: shape_id.to_string(),
            shape_pt_lat: lat.to_string(),
            shape_pt_lon: lon.to_string(),
            shape_pt_sequence: sequence.to_string(),
        }
    }

    fn trip(route_id: &str, trip_id: &str, shape_id: &str) -> FeedTrip {
        FeedTrip {
            route_id: route_id.to_string(),
            trip_id: trip_id.to_string(),
            shape_id: shape_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_shape_points_are_ordered_and_deduplicated() {
        let trips = vec![trip("1", "t1", "S"), trip("2", "t2", "S")];
        let shapes = vec![
            shape_point("S", "40.2", "-74.0", "2"),
            shape_point("S", "40.0", "-74.0", "0"),
            shape_point("S", "40.0", "-74.0", "1"),
            shape_point("S", "40.3", "-74.1", "3"),
        ];

        let segments = shape_segments(&trips, shapes, Path::new("feed"));
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].points,
            vec![
                coord! { x: -74.0, y: 40.0 },
                coord! { x: -74.0, y: 40.2 },
                coord! { x: -74.1, y: 40.3 },
            ]
        );
        assert_eq!(
            segments[0].routes,
            BTreeSet::from([RouteId::new("1"), RouteId::new("2")])
        );
    }

    #[test]
    fn test_unreferenced_and_degenerate_shapes_are_dropped() {
        let trips = vec![trip("1", "t1", "short")];
        let shapes = vec![
            shape_point("orphan", "40.0", "-74.0", "0"),
            shape_point("orphan", "40.1", "-74.0", "1"),
            shape_point("short", "40.0", "-74.0", "0"),
            shape_point("short", "40.0", "-74.0", "1"),
            shape_point("short", "bad", "-74.0", "2"),
        ];

        let segments = shape_segments(&trips, shapes, Path::new("feed"));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_stops_without_location_are_skipped() {
        let stops = vec![
            FeedStop {
                stop_id: "101N".to_string(),
                stop_lat: "40.889248".to_string(),
                stop_lon: "-73.898583".to_string(),
                ..Default::default()
            },
            FeedStop {
                stop_id: "102N".to_string(),
                ..Default::default()
            },
        ];

        let locations = stop_locations(stops, Path::new("feed"));
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].stop_id.as_str(), "101N");
        assert_eq!(locations[0].point, coord! { x: -73.898583, y: 40.889248 });
    }
}
