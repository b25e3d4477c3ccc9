//! The JSON API of the map page
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

use schedule_search::clock::CivilClock;
use schedule_search::search_data::Snapshot;
use schedule_search::time::Time;

use crate::state::SharedSnapshot;

mod network_endpoint;
mod trip_endpoint;

pub use network_endpoint::{lines_route, status_route, stops_route};
pub use trip_endpoint::{
    bus_positions_route, direct_trips_route, stop_schedule_route, trip_details_route,
    trip_path_route,
};

pub fn with_data<D: Sync + Send>(
    db: Arc<D>,
) -> impl Filter<Extract = (Arc<D>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || db.clone())
}

#[derive(Serialize)]
struct Unavailable {
    error: &'static str,
}

/// Runs `query` against the current snapshot at the time of day of `clock`. 503 when there is
/// no snapshot for the service day of `clock`.
fn answer<F>(shared: &SharedSnapshot, clock: &CivilClock, query: F) -> WithStatus<Json>
where
    F: FnOnce(&Snapshot, Time) -> Json,
{
    let now = clock.now();
    match shared.current() {
        Some(snapshot) if snapshot.service_day() == now.day => {
            warp::reply::with_status(query(&snapshot, now.time), StatusCode::OK)
        }
        Some(snapshot) => {
            debug!(
                "Snapshot of {} not answering for {}",
                snapshot.service_day(),
                now.day
            );
            unavailable()
        }
        None => unavailable(),
    }
}

fn unavailable() -> WithStatus<Json> {
    warp::reply::with_status(
        warp::reply::json(&Unavailable {
            error: "timetable unavailable",
        }),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

/// Every endpoint under `/api`
pub fn api_routes(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let cors = warp::cors().allow_any_origin();
    warp::get()
        .and(
            lines_route(shared.clone(), clock.clone())
                .or(stops_route(shared.clone(), clock.clone()))
                .or(status_route(shared.clone(), clock.clone()))
                .or(bus_positions_route(shared.clone(), clock.clone()))
                .or(trip_details_route(shared.clone(), clock.clone()))
                .or(trip_path_route(shared.clone(), clock.clone()))
                .or(stop_schedule_route(shared.clone(), clock.clone()))
                .or(direct_trips_route(shared, clock)),
        )
        .with(cors)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gtfs::db::{
        self,
        test::{all_tables, gtfs_dir, monday},
    };
    use chrono::{TimeZone, Utc};
    use schedule_search::clock::FixedClock;
    use serde_json::{json, Value};

    fn shared(name: &str) -> Arc<SharedSnapshot> {
        let dir = gtfs_dir(name, &all_tables());
        Arc::new(SharedSnapshot::new(db::load_data(&dir, monday()).unwrap()))
    }

    /// Monday 2024-03-04 at the given time in Paris, an hour ahead of UTC in winter
    fn paris_clock(hour: u32, minute: u32, second: u32) -> Arc<CivilClock> {
        Arc::new(CivilClock::new(
            chrono_tz::Europe::Paris,
            FixedClock(Utc.ymd(2024, 3, 4).and_hms(hour - 1, minute, second)),
        ))
    }

    async fn get<F>(api: &F, path: &str) -> (StatusCode, Value)
    where
        F: Filter + 'static,
        F::Extract: warp::Reply + Send,
    {
        let res = warp::test::request().method("GET").path(path).reply(api).await;
        let body = serde_json::from_slice(res.body()).unwrap();
        (res.status(), body)
    }

    #[tokio::test]
    async fn lines() {
        let api = api_routes(shared("api-lines"), paris_clock(7, 0, 0));
        let (status, body) = get(&api, "/api/lines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "route_id": "R1",
                "route_short_name": "1",
                "route_long_name": "Ligne 1",
                "route_color": "FF0000",
                "route_text_color": "FFFFFF",
            }])
        );
    }

    #[tokio::test]
    async fn stops() {
        let api = api_routes(shared("api-stops"), paris_clock(7, 0, 0));
        let (_, body) = get(&api, "/api/stops").await;
        assert_eq!(
            body,
            json!([
                {
                    "stop_id": "A",
                    "stop_name": "Gare",
                    "stop_lat": 47.5,
                    "stop_lon": 4.0,
                    "lines": ["1"],
                },
                {
                    "stop_id": "B",
                    "stop_name": "Mairie",
                    "stop_lat": 47.51,
                    "stop_lon": 4.01,
                    "lines": ["1"],
                },
            ])
        );
    }

    #[tokio::test]
    async fn bus_positions() {
        let api = api_routes(shared("api-positions"), paris_clock(8, 2, 30));
        let (_, body) = get(&api, "/api/bus-positions").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "T1");
        assert_eq!(body[0]["dest"], "Mairie");
        assert_eq!(body[0]["p_lat"], 47.5);
        assert_eq!(body[0]["n_lat"], 47.51);
        assert_eq!(body[0]["pct"], 0.5);

        let api = api_routes(shared("api-no-positions"), paris_clock(12, 0, 0));
        let (_, body) = get(&api, "/api/bus-positions").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn trip_details_and_path() {
        let api = api_routes(shared("api-trip"), paris_clock(7, 0, 0));
        let (_, body) = get(&api, "/api/trip-details?trip_id=T1").await;
        assert_eq!(body[0]["stop_name"], "Gare");
        assert_eq!(body[1]["stop_sequence"], 2);
        assert_eq!(body[1]["arrival_time"], "08:05:00");
        assert_eq!(body[1]["arrival_sec"], 29100);

        let (_, body) = get(&api, "/api/trip-path?trip_id=T1").await;
        assert_eq!(body, json!([[47.5, 4.0], [47.51, 4.01]]));

        for path in &[
            "/api/trip-path?trip_id=NOPE",
            "/api/trip-path?",
            "/api/trip-details?trip_id=",
        ] {
            let (status, body) = get(&api, path).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!([]), "{}", path);
        }
    }

    #[tokio::test]
    async fn stop_schedule() {
        let api = api_routes(shared("api-schedule"), paris_clock(7, 59, 0));
        let (_, body) = get(&api, "/api/stop-schedule?stop_name=Gare").await;
        assert_eq!(
            body,
            json!([{
                "trip_id": "T1",
                "line": "1",
                "dest": "Mairie",
                "time": "08:00",
                "wait": 1,
                "color": "FF0000",
                "text_color": "FFFFFF",
            }])
        );

        let (_, body) = get(&api, "/api/stop-schedule?stop_name=Nowhere").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn direct_trips() {
        let api = api_routes(shared("api-route"), paris_clock(7, 0, 0));
        let (_, body) = get(&api, "/api/route?start=gare&end=MAIRIE").await;
        assert_eq!(
            body,
            json!([{
                "trip_id": "T1",
                "line": "1",
                "dep": "08:00",
                "arr": "08:05",
                "color": "FF0000",
            }])
        );

        let (_, body) = get(&api, "/api/route?start=mairie&end=gare").await;
        assert_eq!(body, json!([]));
        let (_, body) = get(&api, "/api/route?start=gare").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn status() {
        let api = api_routes(shared("api-status"), paris_clock(7, 0, 0));
        let (_, body) = get(&api, "/api/status").await;
        assert_eq!(body["service_date"], "2024-03-04");
        assert_eq!(body["weekday"], "mon");
        assert_eq!(body["calendar"], "applied");
        assert_eq!(body["active_trips"], 1);
        assert_eq!(body["total_trips"], 2);
        assert_eq!(body["stops"], 2);
        assert_eq!(body["lines"], 1);
        assert_eq!(body["local_time"], "07:00:00");
    }

    #[tokio::test]
    async fn snapshot_of_another_day() {
        let tuesday = Arc::new(CivilClock::new(
            chrono_tz::Europe::Paris,
            FixedClock(Utc.ymd(2024, 3, 5).and_hms(0, 0, 30)),
        ));
        let api = api_routes(shared("api-yesterday"), tuesday);
        for path in &[
            "/api/bus-positions",
            "/api/stops",
            "/api/route?start=gare&end=mairie",
        ] {
            let (status, body) = get(&api, path).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, json!({"error": "timetable unavailable"}));
        }
    }

    #[tokio::test]
    async fn unavailable_timetable() {
        let api = api_routes(Arc::new(SharedSnapshot::unavailable()), paris_clock(7, 0, 0));
        for path in &["/api/lines", "/api/stop-schedule?stop_name=Gare", "/api/status"] {
            let (status, body) = get(&api, path).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, json!({"error": "timetable unavailable"}));
        }
    }
}
