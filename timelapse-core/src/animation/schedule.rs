use serde::{Deserialize, Serialize};

use crate::{Error, RouteId, StopId, TripId};

/// One scheduled call at a stop, times in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopVisit {
    #[serde(rename = "stopID")]
    pub stop_id: StopId,
    pub arrival: f64,
    pub departure: f64,
}

/// A vehicle's run along one route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSchedule {
    pub id: TripId,
    #[serde(rename = "routeID")]
    pub route_id: RouteId,
    pub stops: Vec<StopVisit>,
}

impl TripSchedule {
    /// Checks that the trip visits at least two stops and that its times
    /// never run backwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] describing the first offending visit
    pub fn validate(&self) -> Result<(), Error> {
        if self.stops.len() < 2 {
            return Err(Error::InvalidData(format!(
                "trip {} visits {} stops, at least 2 are required",
                self.id,
                self.stops.len()
            )));
        }

        let mut previous_departure = f64::NEG_INFINITY;
        for visit in &self.stops {
            if !visit.arrival.is_finite() || !visit.departure.is_finite() {
                return Err(Error::InvalidData(format!(
                    "trip {} has a non-finite time at stop {}",
                    self.id, visit.stop_id
                )));
            }
            if visit.departure < visit.arrival {
                return Err(Error::InvalidData(format!(
                    "trip {} departs stop {} before arriving",
                    self.id, visit.stop_id
                )));
            }
            if visit.arrival < previous_departure {
                return Err(Error::InvalidData(format!(
                    "trip {} arrives at stop {} before leaving the previous stop",
                    self.id, visit.stop_id
                )));
            }
            previous_departure = visit.departure;
        }

        // Every partial span is bounded by the whole one
        if let (Some(start), Some(end)) = (self.start_time(), self.end_time())
            && !(end - start).is_finite()
        {
            return Err(Error::InvalidData(format!(
                "trip {} spans more time than can be represented",
                self.id
            )));
        }
        Ok(())
    }

    /// First arrival, `None` for a trip without stops
    pub fn start_time(&self) -> Option<f64> {
        self.stops.first().map(|visit| visit.arrival)
    }

    /// Last departure, `None` for a trip without stops
    pub fn end_time(&self) -> Option<f64> {
        self.stops.last().map(|visit| visit.departure)
    }

    /// Whether the vehicle is on the network at `time`
    pub fn is_active_at(&self, time: f64) -> bool {
        matches!(
            (self.start_time(), self.end_time()),
            (Some(start), Some(end)) if (start..=end).contains(&time)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(stop: &str, arrival: f64, departure: f64) -> StopVisit {
        StopVisit {
            stop_id: StopId::new(stop),
            arrival,
            departure,
        }
    }

    fn trip(stops: Vec<StopVisit>) -> TripSchedule {
        TripSchedule {
            id: TripId::new("trip"),
            route_id: RouteId::new("1"),
            stops,
        }
    }

    #[test]
    fn test_decodes_realtime_trip_json() {
        let json = r#"{
            "id": "057200_1..S03R",
            "routeID": "1",
            "stops": [
                {"stopID": "101S", "arrival": 1700000000, "departure": 1700000030},
                {"stopID": "103S", "arrival": 1700000090, "departure": 1700000090}
            ]
        }"#;
        let schedule: TripSchedule = serde_json::from_str(json).unwrap();

        assert_eq!(schedule.route_id.as_str(), "1");
        assert_eq!(schedule.stops[1].stop_id.as_str(), "103S");
        assert_eq!(schedule.start_time(), Some(1_700_000_000.0));
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_rejects_single_stop() {
        let schedule = trip(vec![visit("A", 0.0, 10.0)]);
        assert!(matches!(schedule.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_rejects_time_running_backwards() {
        let schedule = trip(vec![visit("A", 0.0, 10.0), visit("B", 5.0, 20.0)]);
        assert!(matches!(schedule.validate(), Err(Error::InvalidData(_))));

        let schedule = trip(vec![visit("A", 10.0, 0.0), visit("B", 20.0, 20.0)]);
        assert!(matches!(schedule.validate(), Err(Error::InvalidData(_))));

        let schedule = trip(vec![visit("A", 0.0, f64::NAN), visit("B", 20.0, 20.0)]);
        assert!(matches!(schedule.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_rejects_unrepresentable_span() {
        let schedule = trip(vec![
            visit("A", -1.7e308, -1.7e308),
            visit("B", 1.79e308, 1.79e308),
        ]);
        assert!(matches!(schedule.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_active_window() {
        let schedule = trip(vec![visit("A", 0.0, 10.0), visit("B", 20.0, 30.0)]);
        assert!(!schedule.is_active_at(-1.0));
        assert!(schedule.is_active_at(0.0));
        assert!(schedule.is_active_at(30.0));
        assert!(!schedule.is_active_at(30.5));
    }
}
