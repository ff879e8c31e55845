use std::sync::Arc;

use geo::Point;
use log::warn;

use super::schedule::{StopVisit, TripSchedule};
use crate::{Error, NetworkGraph, Path, Projection, StopId, TripId};

/// Where a vehicle is at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub trip_id: TripId,
    /// Geographic `(lon, lat)`
    pub point: Point<f64>,
    /// Stop the vehicle is at, or last departed from
    pub from_stop: StopId,
    /// Next stop while travelling, `None` while dwelling
    pub to_stop: Option<StopId>,
}

impl VehiclePosition {
    pub fn is_dwelling(&self) -> bool {
        self.to_stop.is_none()
    }
}

/// A trip with the path of every leg resolved against one graph
#[derive(Debug, Clone)]
pub struct VehicleTrack {
    trip_id: TripId,
    visits: Vec<StopVisit>,
    /// `legs[i]` runs from `visits[i]` to `visits[i + 1]`
    legs: Vec<Option<Arc<Path>>>,
}

impl VehicleTrack {
    /// Validates the schedule and finds the path of each consecutive stop
    /// pair on the trip's route. Paths come from the graph's cache, so tracks
    /// of trips on the same line share them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the schedule is malformed
    pub fn new(graph: &mut NetworkGraph, schedule: TripSchedule) -> Result<Self, Error> {
        schedule.validate()?;

        let legs = schedule
            .stops
            .windows(2)
            .map(|pair| {
                graph.shortest_path(&pair[0].stop_id, &pair[1].stop_id, &schedule.route_id)
            })
            .collect();

        Ok(Self {
            trip_id: schedule.id,
            visits: schedule.stops,
            legs,
        })
    }

    pub fn trip_id(&self) -> &TripId {
        &self.trip_id
    }

    pub fn legs(&self) -> &[Option<Arc<Path>>] {
        &self.legs
    }

    /// Position at `time`, or `None` outside the trip's schedule or when the
    /// relevant stop is not on the network.
    ///
    /// Between stops the vehicle moves at constant planar speed along the
    /// leg's path. A leg without a path holds the vehicle at the stop it
    /// departed from.
    pub fn position_at<P: Projection + ?Sized>(
        &self,
        graph: &NetworkGraph,
        time: f64,
        projection: &P,
    ) -> Option<VehiclePosition> {
        let (first, last) = (self.visits.first()?, self.visits.last()?);
        if time < first.arrival || time > last.departure {
            return None;
        }

        // Last visit the vehicle has arrived at
        let current = self.visits.partition_point(|visit| visit.arrival <= time) - 1;
        let visit = &self.visits[current];
        if time <= visit.departure {
            return self.at_stop(graph, visit, None);
        }

        let next = &self.visits[current + 1];
        let Some(path) = &self.legs[current] else {
            return self.at_stop(graph, visit, Some(next));
        };
        if path.is_empty() {
            return self.at_stop(graph, visit, Some(next));
        }

        let fraction = (time - visit.departure) / (next.arrival - visit.departure);
        if !fraction.is_finite() {
            return self.at_stop(graph, visit, Some(next));
        }
        let fraction = fraction.clamp(0.0, 1.0);
        Some(VehiclePosition {
            trip_id: self.trip_id.clone(),
            point: graph.interpolate_path(path, fraction, projection),
            from_stop: visit.stop_id.clone(),
            to_stop: Some(next.stop_id.clone()),
        })
    }

    fn at_stop(
        &self,
        graph: &NetworkGraph,
        visit: &StopVisit,
        next: Option<&StopVisit>,
    ) -> Option<VehiclePosition> {
        let node = graph.node_by_stop_id(&visit.stop_id)?;
        Some(VehiclePosition {
            trip_id: self.trip_id.clone(),
            point: node.point,
            from_stop: visit.stop_id.clone(),
            to_stop: next.map(|next| next.stop_id.clone()),
        })
    }
}

/// Positions of every trip running at `time`.
///
/// Trips outside their schedule at `time` are skipped without resolving
/// their paths. Malformed trips, and trips naming a route or stop the
/// network does not know, are skipped with a warning and never reach the
/// path cache.
pub fn positions_at<P: Projection + ?Sized>(
    graph: &mut NetworkGraph,
    trips: impl IntoIterator<Item = TripSchedule>,
    time: f64,
    projection: &P,
) -> Vec<VehiclePosition> {
    let mut positions = Vec::new();
    for trip in trips {
        if !trip.is_active_at(time) {
            continue;
        }
        let trip_id = trip.id.clone();
        if !graph.has_route(&trip.route_id) {
            warn!("Skipping trip {trip_id}: unknown route {}", trip.route_id);
            continue;
        }
        if let Some(unknown) = trip
            .stops
            .iter()
            .find(|visit| graph.node_by_stop_id(&visit.stop_id).is_none())
        {
            warn!("Skipping trip {trip_id}: unknown stop {}", unknown.stop_id);
            continue;
        }
        match VehicleTrack::new(graph, trip) {
            Ok(track) => positions.extend(track.position_at(graph, time, projection)),
            Err(e) => warn!("Skipping trip {trip_id}: {e}"),
        }
    }
    positions
}
