use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::calendar::{ActiveServices, CalendarStatus, ServiceDay};
use crate::time::{parse_time_of_day, Time};

pub type RouteId = String;
pub type TripId = String;
pub type StopId = String;
pub type ServiceId = String;

/// Refers to a specific stop of a specific trip (an arrival / departure), the index is the position
/// in the trip's stop times once sorted by sequence
pub type TripStopRef = (TripId, u16);

/// Immutable schedule index of one service day's timetable.
///
/// Built once by the loader with a `Builder`, then only read. Calendar filtering has already
/// happened: only the trips running on `service_day` are present, along with their stop times.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) routes: BTreeMap<RouteId, Route>,
    pub(crate) trips: HashMap<TripId, Trip>,
    pub(crate) stops: HashMap<StopId, Stop>,
    /// stop ids sharing each display name, in the order the stops were added
    pub(crate) stops_by_name: BTreeMap<String, Vec<StopId>>,

    pub(crate) service_day: ServiceDay,
    pub(crate) calendar_status: CalendarStatus,
}

impl Snapshot {
    pub fn builder(service_day: ServiceDay, active_services: ActiveServices) -> Builder {
        Builder {
            data: Snapshot {
                routes: BTreeMap::new(),
                trips: HashMap::new(),
                stops: HashMap::new(),
                stops_by_name: BTreeMap::new(),
                service_day,
                calendar_status: CalendarStatus::Applied {
                    active_trips: 0,
                    total_trips: 0,
                },
            },
            active_services,
            stop_order: Vec::new(),
            total_trips: 0,
            skipped_trips: 0,
            pruned_stop_times: 0,
            unresolved_stop_times: 0,
        }
    }

    pub fn service_day(&self) -> ServiceDay {
        self.service_day
    }

    pub fn calendar_status(&self) -> &CalendarStatus {
        &self.calendar_status
    }

    pub fn get_stop(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn get_trip(&self, id: &str) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn get_route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    /// Get the route that the specified trip is a part of
    pub fn get_route_for_trip(&self, trip: &Trip) -> Option<&Route> {
        self.routes.get(&trip.route_id)
    }

    /// Ids of all stops displayed with exactly this name
    pub fn stop_ids_named(&self, name: &str) -> &[StopId] {
        self.stops_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    /// All lines, ordered by route id
    pub fn lines(&self) -> Vec<&Route> {
        self.routes.values().collect()
    }

    /// One entry per display name, ordered by name
    ///
    /// The first stop of the name represents it. The lines shown are the first non empty set of
    /// lines among the stops of that name.
    pub fn unique_stops(&self) -> Vec<StopSummary> {
        self.stops_by_name
            .iter()
            .filter_map(|(name, ids)| {
                let first = self.stops.get(ids.first()?)?;
                let lines = ids
                    .iter()
                    .filter_map(|id| self.stops.get(id))
                    .map(|stop| &stop.lines)
                    .find(|lines| !lines.is_empty())
                    .map(|lines| lines.iter().cloned().collect())
                    .unwrap_or_default();
                Some(StopSummary {
                    stop_id: first.stop_id.clone(),
                    stop_name: name.clone(),
                    stop_lat: first.lat(),
                    stop_lon: first.lon(),
                    lines,
                })
            })
            .collect()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Snapshot {} [{} routes, {} trips, {} stops]",
            self.service_day,
            self.routes.len(),
            self.trips.len(),
            self.stops.len()
        )
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_name: String,
    /// x is the longitude, y the latitude
    pub location: geo::Point<f64>,
    /// Short names of the lines of the active trips calling here
    pub lines: BTreeSet<String>,
    /// Departures from this stop by time, only departures of active trips
    pub departures: BTreeMap<Time, Vec<TripStopRef>>,
}

impl Stop {
    pub fn lat(&self) -> f64 {
        self.location.lat()
    }

    pub fn lon(&self) -> f64 {
        self.location.lng()
    }
}

impl fmt::Debug for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.stop_name, self.stop_id)
    }
}

impl PartialEq for Stop {
    fn eq(&self, rhs: &Self) -> bool {
        self.stop_id == rhs.stop_id
    }
}

impl Eq for Stop {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Identifies a route.
    pub route_id: RouteId,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_color: String,
    pub route_text_color: String,
}

impl PartialEq for Route {
    fn eq(&self, rhs: &Self) -> bool {
        self.route_id == rhs.route_id
    }
}

impl Eq for Route {}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    /// Identifies a trip.
    pub trip_id: TripId,
    pub route_id: RouteId,
    /// Identifies a set of dates when service is available for one or more routes.
    pub service_id: ServiceId,
    /// Destination shown on the vehicle
    pub headsign: String,
    /// Sorted by sequence
    pub stop_times: Vec<StopTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StopTime {
    pub stop_id: StopId,
    /// Order within the trip, passed through as found in the timetable
    pub sequence: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
    /// Arrival as written in the timetable, even when it couldn't be read
    pub arrival_text: String,
}

/// list-stops record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StopSummary {
    pub stop_id: StopId,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub lines: Vec<String>,
}

pub struct Builder {
    data: Snapshot,
    active_services: ActiveServices,
    /// stop ids in the order they were added, for "first stop of a name"
    stop_order: Vec<StopId>,
    total_trips: usize,
    skipped_trips: usize,
    pruned_stop_times: usize,
    unresolved_stop_times: usize,
}

impl Builder {
    pub fn add_stop(&mut self, stop_id: StopId, stop_name: String, location: geo::Point<f64>) {
        if self.data.stops.contains_key(&stop_id) {
            return;
        }
        self.stop_order.push(stop_id.clone());
        self.data.stops.insert(
            stop_id.clone(),
            Stop {
                stop_id,
                stop_name,
                location,
                lines: BTreeSet::new(),
                departures: BTreeMap::new(),
            },
        );
    }

    pub fn add_route(
        &mut self,
        route_id: RouteId,
        route_short_name: String,
        route_long_name: String,
        route_color: String,
        route_text_color: String,
    ) {
        self.data.routes.insert(
            route_id.clone(),
            Route {
                route_id,
                route_short_name,
                route_long_name,
                route_color,
                route_text_color,
            },
        );
    }

    /// Trips whose service doesn't run on the service day are counted and dropped, as are trips
    /// of unknown routes
    pub fn add_trip(
        &mut self,
        trip_id: TripId,
        route_id: RouteId,
        service_id: ServiceId,
        headsign: String,
    ) {
        self.total_trips += 1;
        if !self.active_services.runs(&service_id) {
            return;
        }
        if !self.data.routes.contains_key(&route_id) {
            self.skipped_trips += 1;
            return;
        }
        self.data.trips.insert(
            trip_id.clone(),
            Trip {
                trip_id,
                route_id,
                service_id,
                headsign,
                stop_times: Vec::new(),
            },
        );
    }

    /// Stop times may be added in any order. Those of trips which aren't running are pruned, those
    /// referencing unknown stops are skipped.
    pub fn add_trip_stop(
        &mut self,
        trip_id: &str,
        sequence: u32,
        arrival_time: Time,
        departure_time: Time,
        stop_id: StopId,
    ) {
        self.push_stop_time(
            trip_id,
            StopTime {
                stop_id,
                sequence,
                arrival_time,
                departure_time,
                arrival_text: arrival_time.to_string(),
            },
        )
    }

    /// As `add_trip_stop`, keeping the arrival as written in the timetable
    pub fn add_timetabled_stop(
        &mut self,
        trip_id: &str,
        sequence: u32,
        arrival_text: String,
        departure_time: Time,
        stop_id: StopId,
    ) {
        self.push_stop_time(
            trip_id,
            StopTime {
                stop_id,
                sequence,
                arrival_time: parse_time_of_day(&arrival_text),
                departure_time,
                arrival_text,
            },
        )
    }

    fn push_stop_time(&mut self, trip_id: &str, stop_time: StopTime) {
        let trip = match self.data.trips.get_mut(trip_id) {
            Some(trip) => trip,
            None => {
                self.pruned_stop_times += 1;
                return;
            }
        };
        if !self.data.stops.contains_key(&stop_time.stop_id) {
            self.unresolved_stop_times += 1;
            return;
        }
        trip.stop_times.push(stop_time);
    }

    pub fn build(mut self) -> Snapshot {
        let data = &mut self.data;
        let mut departure_count = 0;
        for trip in data.trips.values_mut() {
            // stable, so duplicate sequence numbers keep their timetable order
            trip.stop_times.sort_by_key(|stop_time| stop_time.sequence);
            trip.stop_times.shrink_to_fit();

            let line = data
                .routes
                .get(&trip.route_id)
                .map(|route| route.route_short_name.clone())
                .unwrap_or_default();
            for (idx, stop_time) in trip.stop_times.iter().enumerate() {
                let stop = data
                    .stops
                    .get_mut(&stop_time.stop_id)
                    .expect("stop times only reference added stops");
                stop.lines.insert(line.clone());
                stop.departures
                    .entry(stop_time.departure_time)
                    .or_default()
                    .push((trip.trip_id.clone(), idx as u16));
                departure_count += 1;
            }
        }
        for stop in data.stops.values_mut() {
            for departures in stop.departures.values_mut() {
                departures.sort();
            }
        }

        for stop_id in &self.stop_order {
            let stop = &data.stops[stop_id];
            data.stops_by_name
                .entry(stop.stop_name.clone())
                .or_default()
                .push(stop_id.clone());
        }

        data.calendar_status = match self.active_services {
            ActiveServices::All { reason } => CalendarStatus::FailedOpen {
                reason,
                active_trips: data.trips.len(),
                total_trips: self.total_trips,
            },
            ActiveServices::Only(_) => CalendarStatus::Applied {
                active_trips: data.trips.len(),
                total_trips: self.total_trips,
            },
        };

        info!(
            "{} departures of {} trips ({} in the timetable), leaving from {} stops",
            departure_count,
            data.trips.len(),
            self.total_trips,
            data.stops.len()
        );
        if self.pruned_stop_times > 0 {
            info!(
                "{} stop times pruned as their trip isn't running",
                self.pruned_stop_times
            );
        }
        if self.unresolved_stop_times > 0 || self.skipped_trips > 0 {
            info!(
                "{} stop times referencing unknown stops and {} trips of unknown routes skipped",
                self.unresolved_stop_times, self.skipped_trips
            );
        }

        self.data
    }
}
