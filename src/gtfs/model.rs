//! Models of data contained in static GTFS files, as defined at [https://developers.google.com/transit/gtfs/reference]
//! Only the columns the radar uses are read, any others are ignored.

use schedule_search::calendar::CalendarEntry;
use schedule_search::search_data::{RouteId, ServiceId, StopId, TripId};
use schedule_search::time::{parse_time_of_day, Time};
use serde::Deserialize;

/// YYYYMMDD
pub type Date = u32;

/// GTFS record
/// [https://developers.google.com/transit/gtfs/reference#calendartxt]
/// Uniquely identifies a set of dates when service is available for one or more routes.
#[derive(Debug, Deserialize)]
pub struct Calendar {
    /// Each service_id value can appear at most once in a calendar.txt file.
    pub service_id: ServiceId,
    /// Whether the service operates on all Mondays in the date range specified by the start_date and end_date fields.
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub monday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub tuesday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub wednesday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub thursday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub friday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub saturday: bool,
    #[serde(with = "crate::gtfs::time::service_available_format")]
    pub sunday: bool,
    /// Start service day for the service interval.
    pub start_date: Date,
    /// End service day for the service interval. This service day is included in the interval.
    pub end_date: Date,
}

impl From<Calendar> for CalendarEntry {
    fn from(calendar: Calendar) -> CalendarEntry {
        CalendarEntry {
            service_id: calendar.service_id,
            start_date: calendar.start_date,
            end_date: calendar.end_date,
            monday: calendar.monday,
            tuesday: calendar.tuesday,
            wednesday: calendar.wednesday,
            thursday: calendar.thursday,
            friday: calendar.friday,
            saturday: calendar.saturday,
            sunday: calendar.sunday,
        }
    }
}

/// GTFS record
/// [https://developers.google.com/transit/gtfs/reference#routestxt]
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Identifies a route.
    pub route_id: RouteId,
    /// Short name of a route, like "32", "100X", or "Green", that riders use to identify a route.
    #[serde(default)]
    pub route_short_name: String,
    /// Full name of a route, often including the route's destination or stop.
    #[serde(default)]
    pub route_long_name: String,
    /// Hexadecimal colour without the leading `#`
    #[serde(default)]
    pub route_color: String,
    #[serde(default)]
    pub route_text_color: String,
}

/// GTFS Record
/// [https://developers.google.com/transit/gtfs/reference#tripstxt]
#[derive(Debug, Deserialize)]
pub struct Trip {
    /// Identifies a route.
    pub route_id: RouteId,
    /// Identifies a set of dates when service is available for one or more routes.
    pub service_id: ServiceId,
    /// Identifies a trip.
    pub trip_id: TripId,
    /// Text that appears on signage identifying the trip's destination to riders.
    #[serde(default)]
    pub trip_headsign: String,
}

#[derive(Debug, Deserialize)]
pub struct StopTime {
    /// Identifies a trip.
    pub trip_id: TripId,
    /// Arrival time at a specific stop for a specific trip on a route. For times occurring after
    /// midnight on the service day, the time is a value greater than 24:00:00 in HH:MM:SS local
    /// time for the day on which the trip schedule begins. Kept as written, see
    /// `StopTime::arrival`.
    pub arrival_time: String,
    /// Departure time from a specific stop for a specific trip on a route.
    #[serde(with = "crate::gtfs::time::time_format")]
    pub departure_time: Time,
    /// Identifies the serviced stop. A stop may be serviced multiple times in the same trip, and
    /// multiple trips and routes may service the same stop.
    pub stop_id: StopId,
    /// Order of stops for a particular trip. The values must increase along the trip but do not
    /// need to be consecutive.
    pub stop_sequence: u32,
}

impl StopTime {
    pub fn arrival(&self) -> Time {
        parse_time_of_day(&self.arrival_time)
    }
}

/// GTFS Record
/// [https://developers.google.com/transit/gtfs/reference#stopstxt]
#[derive(Debug, Deserialize, Clone)]
pub struct Stop {
    /// Identifies a stop, station, or station entrance.
    pub stop_id: StopId,
    /// Name of the location. Several stops, eg. both sides of a street, can share a name.
    #[serde(default)]
    pub stop_name: String,
    /// Latitude of the location, optional for generic nodes and boarding areas.
    pub stop_lat: Option<f64>,
    /// Longitude of the location, optional for generic nodes and boarding areas.
    pub stop_lon: Option<f64>,
}

impl Stop {
    /// Position as a geo::Point, x is the longitude
    pub fn position(&self) -> Option<geo::Point<f64>> {
        Some(geo::Point::new(self.stop_lon?, self.stop_lat?))
    }
}
