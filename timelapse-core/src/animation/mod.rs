//! Vehicle positions over time.
//!
//! A [`TripSchedule`] lists the stops a vehicle calls at. Resolving it
//! against a graph gives a [`VehicleTrack`], which answers where the vehicle
//! is at any instant of its run.

mod schedule;
mod track;

pub use schedule::{StopVisit, TripSchedule};
pub use track::{VehiclePosition, VehicleTrack, positions_at};
