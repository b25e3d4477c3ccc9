use log::debug;
use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;

use schedule_search::clock::CivilClock;

use super::{answer, with_data};
use crate::state::SharedSnapshot;

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    trip_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StopQuery {
    stop_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    start: Option<String>,
    end: Option<String>,
}

/// The parameter, or the empty string which matches nothing
fn param<'q>(name: &str, value: &'q Option<String>) -> &'q str {
    match value {
        Some(value) => value,
        None => {
            debug!("{} missing from the query", name);
            ""
        }
    }
}

async fn bus_positions_handler(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(answer(&shared, &clock, |data, now| {
        warp::reply::json(&data.vehicle_positions(now))
    }))
}

async fn trip_details_handler(
    query: TripQuery,
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let trip_id = param("trip_id", &query.trip_id);
    Ok(answer(&shared, &clock, |data, _| {
        warp::reply::json(&data.trip_detail(trip_id))
    }))
}

async fn trip_path_handler(
    query: TripQuery,
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let trip_id = param("trip_id", &query.trip_id);
    Ok(answer(&shared, &clock, |data, _| {
        warp::reply::json(&data.trip_path(trip_id))
    }))
}

async fn stop_schedule_handler(
    query: StopQuery,
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let stop_name = param("stop_name", &query.stop_name);
    Ok(answer(&shared, &clock, |data, now| {
        warp::reply::json(&data.stop_schedule(stop_name, now))
    }))
}

async fn direct_trips_handler(
    query: RouteQuery,
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let start = param("start", &query.start);
    let end = param("end", &query.end);
    Ok(answer(&shared, &clock, |data, now| {
        warp::reply::json(&data.find_direct_trips(start, end, now))
    }))
}

pub fn bus_positions_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "bus-positions")
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(bus_positions_handler)
}

pub fn trip_details_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "trip-details")
        .and(warp::query::<TripQuery>())
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(trip_details_handler)
}

pub fn trip_path_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "trip-path")
        .and(warp::query::<TripQuery>())
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(trip_path_handler)
}

pub fn stop_schedule_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "stop-schedule")
        .and(warp::query::<StopQuery>())
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(stop_schedule_handler)
}

pub fn direct_trips_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "route")
        .and(warp::query::<RouteQuery>())
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(direct_trips_handler)
}
