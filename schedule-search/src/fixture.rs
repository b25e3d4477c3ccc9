//! A small network used by the tests of every query
//!
//! Monday 2024-03-04, lines 7 and 12 run on weekdays, line 30 only on sundays.
//!
//! | trip | line | calls |
//! |------|------|-------|
//! | T1   | 12   | Gare (A) 08:00, Mairie 08:05-08:06, Université 08:15 |
//! | T2   | 7    | Université 08:10, Mairie 08:20, Gare (B) 08:30 |
//! | T3   | 12   | Gare (A) 09:00, Mairie 09:05-09:06, Université 09:15 |
//! | T4   | 7    | Gare (B) 10:00, Mairie 10:10, Mairie 10:20 |
//! | SUN1 | 30   | Hôpital 08:00, Gare (A) 08:10 |

use chrono::NaiveDate;

use crate::calendar::{ActiveServices, CalendarEntry, ServiceDay};
use crate::search_data::{Builder, Snapshot};
use crate::time::Time;

pub(crate) fn hms(hours: u32, minutes: u32, seconds: u32) -> Time {
    Time::from_hms(hours, minutes, seconds)
}

pub(crate) fn monday() -> ServiceDay {
    ServiceDay::new(NaiveDate::from_ymd(2024, 3, 4))
}

fn service(service_id: &str, weekdays: bool) -> CalendarEntry {
    CalendarEntry {
        service_id: service_id.to_owned(),
        start_date: 20240101,
        end_date: 20241231,
        monday: weekdays,
        tuesday: weekdays,
        wednesday: weekdays,
        thursday: weekdays,
        friday: weekdays,
        saturday: false,
        sunday: !weekdays,
    }
}

pub(crate) fn fixture_calendar() -> Vec<CalendarEntry> {
    vec![service("WEEK", true), service("SUN", false)]
}

pub(crate) fn fixture_builder() -> Builder {
    fixture_builder_with(ActiveServices::from_calendar(&fixture_calendar(), monday()))
}

pub(crate) fn fixture_builder_with(active_services: ActiveServices) -> Builder {
    let mut builder = Snapshot::builder(monday(), active_services);
    for &(id, name, lat, lon) in &[
        ("GARE_A", "Gare", 47.500, 4.000),
        ("GARE_B", "Gare", 47.501, 4.001),
        ("MAIRIE", "Mairie", 47.510, 4.010),
        ("UNIV", "Université", 47.530, 4.030),
        ("HOPITAL", "Hôpital", 47.550, 4.050),
        ("DEPOT", "Dépôt", 47.490, 3.990),
    ] {
        builder.add_stop(id.into(), name.into(), geo::Point::new(lon, lat));
    }
    for &(id, short_name, color) in &[
        ("R7", "7", "E2001A"),
        ("R12", "12", "009EE0"),
        ("R30", "30", "6AB023"),
    ] {
        builder.add_route(
            id.into(),
            short_name.into(),
            format!("Ligne {}", short_name),
            color.into(),
            "FFFFFF".into(),
        );
    }
    for &(trip_id, route_id, service_id, headsign) in &[
        ("T1", "R12", "WEEK", "Université"),
        ("T2", "R7", "WEEK", "Gare"),
        ("T3", "R12", "WEEK", "Université"),
        ("T4", "R7", "WEEK", "Mairie"),
        ("SUN1", "R30", "SUN", "Gare"),
    ] {
        builder.add_trip(trip_id.into(), route_id.into(), service_id.into(), headsign.into());
    }
    let stop_times = [
        // deliberately out of sequence order
        ("T1", 3, hms(8, 15, 0), hms(8, 15, 0), "UNIV"),
        ("T1", 1, hms(8, 0, 0), hms(8, 0, 0), "GARE_A"),
        ("T1", 2, hms(8, 5, 0), hms(8, 6, 0), "MAIRIE"),
        ("T2", 1, hms(8, 10, 0), hms(8, 10, 0), "UNIV"),
        ("T2", 2, hms(8, 20, 0), hms(8, 20, 0), "MAIRIE"),
        ("T2", 3, hms(8, 30, 0), hms(8, 30, 0), "GARE_B"),
        ("T3", 1, hms(9, 0, 0), hms(9, 0, 0), "GARE_A"),
        ("T3", 2, hms(9, 5, 0), hms(9, 6, 0), "MAIRIE"),
        ("T3", 3, hms(9, 15, 0), hms(9, 15, 0), "UNIV"),
        ("T4", 1, hms(10, 0, 0), hms(10, 0, 0), "GARE_B"),
        ("T4", 2, hms(10, 10, 0), hms(10, 10, 0), "MAIRIE"),
        ("T4", 3, hms(10, 20, 0), hms(10, 20, 0), "MAIRIE"),
        ("SUN1", 1, hms(8, 0, 0), hms(8, 0, 0), "HOPITAL"),
        ("SUN1", 2, hms(8, 10, 0), hms(8, 10, 0), "GARE_A"),
    ];
    for (trip_id, sequence, arrival, departure, stop_id) in stop_times.iter().cloned() {
        builder.add_trip_stop(trip_id, sequence, arrival, departure, stop_id.into());
    }
    builder
}

pub(crate) fn fixture_snapshot() -> Snapshot {
    fixture_builder().build()
}

pub(crate) fn fixture_snapshot_with(active_services: ActiveServices) -> Snapshot {
    fixture_builder_with(active_services).build()
}
