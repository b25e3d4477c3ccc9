use lazysort::SortedBy;
use serde::Serialize;
use std::cmp::Ordering;
use std::ops::Bound;

use crate::search_data::{Snapshot, StopId, TripId, TripStopRef};
use crate::time::{serialize_hhmm, Time};

const DEPARTURE_LIMIT: usize = 10;

/// stop-schedule record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Departure {
    pub trip_id: TripId,
    pub line: String,
    #[serde(rename = "dest")]
    pub destination: String,
    #[serde(rename = "time", serialize_with = "serialize_hhmm")]
    pub departure_time: Time,
    /// Whole minutes until departure
    pub wait: i32,
    pub color: String,
    pub text_color: String,
}

/// trip-detail record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TripStop {
    pub stop_id: StopId,
    pub stop_name: String,
    pub stop_sequence: u32,
    pub arrival_time: String,
    pub arrival_sec: u32,
    pub departure_sec: u32,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

fn earliest_first(
    (time_a, ref_a): &(Time, &TripStopRef),
    (time_b, ref_b): &(Time, &TripStopRef),
) -> Ordering {
    time_a.cmp(time_b).then_with(|| ref_a.cmp(ref_b))
}

impl Snapshot {
    /// The next departures strictly after `now` from any of the stops displayed as `stop_name`
    pub fn stop_schedule(&self, stop_name: &str, now: Time) -> Vec<Departure> {
        self.stop_ids_named(stop_name)
            .iter()
            .filter_map(|stop_id| self.get_stop(stop_id))
            .flat_map(|stop| {
                stop.departures
                    .range((Bound::Excluded(now), Bound::Unbounded))
                    .flat_map(|(&time, stop_refs)| {
                        stop_refs.iter().map(move |stop_ref| (time, stop_ref))
                    })
            })
            .sorted_by(earliest_first)
            .take(DEPARTURE_LIMIT)
            .filter_map(|(departure_time, (trip_id, _))| {
                let trip = self.get_trip(trip_id)?;
                let route = self.get_route_for_trip(trip)?;
                Some(Departure {
                    trip_id: trip_id.clone(),
                    line: route.route_short_name.clone(),
                    destination: trip.headsign.clone(),
                    departure_time,
                    wait: (departure_time - now).to_mins(),
                    color: route.route_color.clone(),
                    text_color: route.route_text_color.clone(),
                })
            })
            .collect()
    }

    /// Every call of the trip in sequence order, empty for an unknown trip
    pub fn trip_detail(&self, trip_id: &str) -> Vec<TripStop> {
        let trip = match self.get_trip(trip_id) {
            Some(trip) => trip,
            None => return vec![],
        };
        trip.stop_times
            .iter()
            .filter_map(|stop_time| {
                let stop = self.get_stop(&stop_time.stop_id)?;
                Some(TripStop {
                    stop_id: stop.stop_id.clone(),
                    stop_name: stop.stop_name.clone(),
                    stop_sequence: stop_time.sequence,
                    arrival_time: stop_time.arrival_text.clone(),
                    arrival_sec: stop_time.arrival_time.to_secs(),
                    departure_sec: stop_time.departure_time.to_secs(),
                    stop_lat: stop.lat(),
                    stop_lon: stop.lon(),
                })
            })
            .collect()
    }

    /// `[lat, lon]` of every call of the trip in sequence order, empty for an unknown trip
    pub fn trip_path(&self, trip_id: &str) -> Vec<[f64; 2]> {
        self.get_trip(trip_id)
            .map(|trip| {
                trip.stop_times
                    .iter()
                    .filter_map(|stop_time| self.get_stop(&stop_time.stop_id))
                    .map(|stop| [stop.lat(), stop.lon()])
                    .collect()
            })
            .unwrap_or_default()
    }
}
