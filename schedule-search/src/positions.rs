//! Where the vehicles are, going by the timetable alone

use serde::Serialize;

use crate::search_data::{Snapshot, StopTime, Trip, TripId};
use crate::time::Time;

/// Seconds either side of now, stop times further away can't bound the current segment of a trip
const SLACK_SECS: i64 = 30 * 60;

/// A vehicle between two stops, `pct` of the way along the scheduled segment.
///
/// The point itself is left to the consumer to compute, see `position`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Vehicle {
    #[serde(rename = "id")]
    pub trip_id: TripId,
    pub line: String,
    #[serde(rename = "dest")]
    pub destination: String,
    pub color: String,
    pub text_color: String,
    #[serde(rename = "p_lat")]
    pub previous_lat: f64,
    #[serde(rename = "p_lon")]
    pub previous_lon: f64,
    #[serde(rename = "n_lat")]
    pub next_lat: f64,
    #[serde(rename = "n_lon")]
    pub next_lon: f64,
    pub pct: f64,
}

impl Vehicle {
    /// Linear interpolation between the previous and next stop, x is the longitude
    pub fn position(&self) -> geo::Point<f64> {
        geo::Point::new(
            self.previous_lon + self.pct * (self.next_lon - self.previous_lon),
            self.previous_lat + self.pct * (self.next_lat - self.previous_lat),
        )
    }
}

impl Snapshot {
    /// One vehicle for each trip currently between two different stops, ordered by trip id
    pub fn vehicle_positions(&self, now: Time) -> Vec<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self
            .trips
            .values()
            .filter_map(|trip| self.vehicle_of_trip(trip, now))
            .collect();
        vehicles.sort_by(|a, b| a.trip_id.cmp(&b.trip_id));
        vehicles
    }

    fn vehicle_of_trip(&self, trip: &Trip, now: Time) -> Option<Vehicle> {
        let (previous, next) = current_segment(&trip.stop_times, now)?;
        // a vehicle waiting at its terminus has no segment to be on
        if previous.stop_id == next.stop_id {
            return None;
        }

        let total = (next.arrival_time - previous.departure_time).to_secs();
        let elapsed = (now - previous.departure_time).to_secs();
        let pct = if total > 0 {
            f64::from(elapsed) / f64::from(total)
        } else {
            0.0
        };

        let route = self.get_route_for_trip(trip)?;
        let from = self.get_stop(&previous.stop_id)?;
        let to = self.get_stop(&next.stop_id)?;
        Some(Vehicle {
            trip_id: trip.trip_id.clone(),
            line: route.route_short_name.clone(),
            destination: trip.headsign.clone(),
            color: route.route_color.clone(),
            text_color: route.route_text_color.clone(),
            previous_lat: from.lat(),
            previous_lon: from.lon(),
            next_lat: to.lat(),
            next_lon: to.lon(),
            pct,
        })
    }
}

/// The last stop departed from and the first stop not yet arrived at, among the stop times close
/// enough to `now`. Either can be missing: before the trip starts or after it ends.
fn current_segment(stop_times: &[StopTime], now: Time) -> Option<(&StopTime, &StopTime)> {
    let now_secs = i64::from(now.to_secs());
    let in_window = move |stop_time: &&StopTime| {
        i64::from(stop_time.arrival_time.to_secs()) > now_secs - SLACK_SECS
            && i64::from(stop_time.departure_time.to_secs()) < now_secs + SLACK_SECS
    };
    let window = stop_times.iter().filter(in_window);
    let previous = window
        .clone()
        .filter(|stop_time| stop_time.departure_time <= now)
        .last()?;
    let next = window
        .clone()
        .find(|stop_time| stop_time.arrival_time >= now)?;
    Some((previous, next))
}
