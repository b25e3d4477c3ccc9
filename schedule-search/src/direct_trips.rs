use lazysort::SortedBy;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::Bound;

use crate::search_data::{Snapshot, StopId, Trip, TripId};
use crate::time::{serialize_hhmm, Time};

const RESULT_LIMIT: usize = 10;

/// find-route record, a trip which can be taken from start to end without changing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectTrip {
    pub trip_id: TripId,
    pub line: String,
    #[serde(rename = "dep", serialize_with = "serialize_hhmm")]
    pub departure: Time,
    #[serde(rename = "arr", serialize_with = "serialize_hhmm")]
    pub arrival: Time,
    pub color: String,
}

/// Index into the trip's stop times of the boarding and alighting calls
type Leg = (usize, usize);

fn soonest_first(
    (trip_a, departure_a, _): &(&Trip, Time, Leg),
    (trip_b, departure_b, _): &(&Trip, Time, Leg),
) -> Ordering {
    departure_a
        .cmp(departure_b)
        .then_with(|| trip_a.trip_id.cmp(&trip_b.trip_id))
}

impl Snapshot {
    /// Stop ids of every stop whose name contains `fragment`, ignoring case. Whitespace in the
    /// fragment is matched as is, an empty fragment matches nothing.
    fn stop_ids_matching(&self, fragment: &str) -> HashSet<&StopId> {
        let fragment = fragment.to_lowercase();
        if fragment.is_empty() {
            return HashSet::new();
        }
        self.stops_by_name
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&fragment))
            .flat_map(|(_, stop_ids)| stop_ids.iter())
            .collect()
    }

    /// Trips leaving a stop matching `start` after `now` which later call at a stop matching `end`,
    /// soonest first. A trip is listed once, at its earliest such departure.
    pub fn find_direct_trips(&self, start: &str, end: &str, now: Time) -> Vec<DirectTrip> {
        let start_ids = self.stop_ids_matching(start);
        if start_ids.is_empty() {
            return vec![];
        }
        let end_ids = self.stop_ids_matching(end);
        if end_ids.is_empty() {
            return vec![];
        }

        let mut legs: HashMap<&TripId, (&Trip, Time, Leg)> = HashMap::new();
        let departures = start_ids
            .iter()
            .filter_map(|stop_id| self.get_stop(stop_id))
            .flat_map(|stop| {
                stop.departures
                    .range((Bound::Excluded(now), Bound::Unbounded))
                    .flat_map(|(&time, stop_refs)| {
                        stop_refs.iter().map(move |stop_ref| (time, stop_ref))
                    })
            });
        for (departure, (trip_id, idx)) in departures {
            let trip = match self.get_trip(trip_id) {
                Some(trip) => trip,
                None => continue,
            };
            let boarding = usize::from(*idx);
            let alighting = match alighting_after(trip, boarding, &end_ids) {
                Some(alighting) => alighting,
                None => continue,
            };
            let candidate = (trip, departure, (boarding, alighting));
            legs.entry(trip_id)
                .and_modify(|best| {
                    if (departure, boarding) < (best.1, (best.2).0) {
                        *best = candidate;
                    }
                })
                .or_insert(candidate);
        }

        legs.into_iter()
            .map(|(_, leg)| leg)
            .sorted_by(soonest_first)
            .take(RESULT_LIMIT)
            .filter_map(|(trip, departure, (_, alighting))| {
                let route = self.get_route_for_trip(trip)?;
                Some(DirectTrip {
                    trip_id: trip.trip_id.clone(),
                    line: route.route_short_name.clone(),
                    departure,
                    arrival: trip.stop_times[alighting].arrival_time,
                    color: route.route_color.clone(),
                })
            })
            .collect()
    }
}

/// The first call after `boarding`, with a later sequence number, at one of `end_ids`
fn alighting_after(trip: &Trip, boarding: usize, end_ids: &HashSet<&StopId>) -> Option<usize> {
    let boarding_sequence = trip.stop_times.get(boarding)?.sequence;
    trip.stop_times
        .iter()
        .enumerate()
        .skip(boarding + 1)
        .find(|(_, stop_time)| {
            stop_time.sequence > boarding_sequence && end_ids.contains(&stop_time.stop_id)
        })
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixture::*;

    fn trip_ids(trips: &[DirectTrip]) -> Vec<&str> {
        trips.iter().map(|trip| trip.trip_id.as_str()).collect()
    }

    #[test]
    fn trips_in_the_right_direction() {
        let snapshot = fixture_snapshot();
        let trips = snapshot.find_direct_trips("Gare", "Université", hms(7, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T1", "T3"]);
        assert_eq!(trips[0].line, "12");
        assert_eq!(trips[0].departure.to_hhmm(), "08:00");
        assert_eq!(trips[0].arrival.to_hhmm(), "08:15");

        let back = snapshot.find_direct_trips("Université", "Gare", hms(7, 0, 0));
        assert_eq!(trip_ids(&back), vec!["T2"]);
        assert_eq!(back[0].arrival.to_hhmm(), "08:30");
    }

    #[test]
    fn fragments_ignore_case() {
        let snapshot = fixture_snapshot();
        let trips = snapshot.find_direct_trips("GARE", "univ", hms(7, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T1", "T3"]);
        let trips = snapshot.find_direct_trips("air", "UNIVERSITÉ", hms(7, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T1", "T3"]);
    }

    #[test]
    fn only_future_departures() {
        let snapshot = fixture_snapshot();
        let trips = snapshot.find_direct_trips("gare", "univ", hms(8, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T3"]);
        assert!(snapshot
            .find_direct_trips("gare", "univ", hms(9, 0, 0))
            .is_empty());
    }

    #[test]
    fn no_matching_stop() {
        let snapshot = fixture_snapshot();
        assert!(snapshot
            .find_direct_trips("nowhere", "univ", hms(7, 0, 0))
            .is_empty());
        assert!(snapshot
            .find_direct_trips("gare", "nowhere", hms(7, 0, 0))
            .is_empty());
        assert!(snapshot.find_direct_trips("", "univ", hms(7, 0, 0)).is_empty());
    }

    #[test]
    fn whitespace_is_part_of_the_fragment() {
        let snapshot = fixture_snapshot();
        assert!(snapshot.find_direct_trips("gare ", "univ", hms(7, 0, 0)).is_empty());
        assert!(snapshot.find_direct_trips("gare", " ", hms(7, 0, 0)).is_empty());
        assert_eq!(
            trip_ids(&snapshot.find_direct_trips("gare", "universit", hms(7, 0, 0))),
            vec!["T1", "T3"]
        );
    }

    #[test]
    fn each_trip_listed_once() {
        let snapshot = fixture_snapshot();
        // "e" matches Gare and Mairie, both before Université on T1
        let trips = snapshot.find_direct_trips("e", "univ", hms(7, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T1", "T3"]);
        assert_eq!(trips[0].departure.to_hhmm(), "08:00");

        // once it has left Gare, T1 can still be caught at Mairie
        let trips = snapshot.find_direct_trips("e", "univ", hms(8, 1, 0));
        assert_eq!(trip_ids(&trips), vec!["T1", "T3"]);
        assert_eq!(trips[0].departure.to_hhmm(), "08:06");
    }

    #[test]
    fn same_stop_name_at_both_ends() {
        let snapshot = fixture_snapshot();
        let trips = snapshot.find_direct_trips("mairie", "mairie", hms(7, 0, 0));
        assert_eq!(trip_ids(&trips), vec!["T4"]);
        assert_eq!(trips[0].departure.to_hhmm(), "10:10");
        assert_eq!(trips[0].arrival.to_hhmm(), "10:20");
    }

    #[test]
    fn services_not_running_today_are_not_offered() {
        let snapshot = fixture_snapshot();
        assert!(snapshot
            .find_direct_trips("hôpital", "gare", hms(7, 0, 0))
            .is_empty());
    }

    #[test]
    fn at_most_ten_trips() {
        let mut builder = fixture_builder();
        for i in 0..15 {
            let trip_id = format!("X{:02}", i);
            builder.add_trip(trip_id.clone(), "R7".into(), "WEEK".into(), "Gare".into());
            builder.add_trip_stop(&trip_id, 1, hms(12, i, 0), hms(12, i, 0), "DEPOT".into());
            let arrival = hms(12, i + 10, 0);
            builder.add_trip_stop(&trip_id, 2, arrival, arrival, "GARE_B".into());
        }
        let snapshot = builder.build();
        let trips = snapshot.find_direct_trips("dépôt", "gare", hms(11, 0, 0));
        assert_eq!(trips.len(), 10);
        assert_eq!(trips[0].trip_id, "X00");
        assert_eq!(trips[9].trip_id, "X09");
    }

    #[test]
    fn serialised_field_names() {
        let snapshot = fixture_snapshot();
        let trips = snapshot.find_direct_trips("gare", "univ", hms(7, 0, 0));
        let json = serde_json::to_value(&trips[0]).unwrap();
        assert_eq!(json["trip_id"], "T1");
        assert_eq!(json["line"], "12");
        assert_eq!(json["dep"], "08:00");
        assert_eq!(json["arr"], "08:15");
        assert_eq!(json["color"], "009EE0");
    }
}
