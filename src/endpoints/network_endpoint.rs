use serde::Serialize;
use std::sync::Arc;
use warp::Filter;

use schedule_search::calendar::CalendarStatus;
use schedule_search::clock::CivilClock;

use super::{answer, with_data};
use crate::state::SharedSnapshot;

/// What is being served
#[derive(Serialize)]
struct FEStatus<'s> {
    service_date: String,
    weekday: String,
    local_time: String,
    timezone: &'static str,
    /// `applied` or `failed_open`
    calendar: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'s str>,
    active_trips: usize,
    total_trips: usize,
    stops: usize,
    lines: usize,
}

async fn lines_handler(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(answer(&shared, &clock, |data, _| {
        warp::reply::json(&data.lines())
    }))
}

async fn stops_handler(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(answer(&shared, &clock, |data, _| {
        warp::reply::json(&data.unique_stops())
    }))
}

async fn status_handler(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(answer(&shared, &clock, |data, now| {
        let calendar_status = data.calendar_status();
        let (calendar, reason) = match calendar_status {
            CalendarStatus::Applied { .. } => ("applied", None),
            CalendarStatus::FailedOpen { reason, .. } => ("failed_open", Some(reason.as_str())),
        };
        warp::reply::json(&FEStatus {
            service_date: data.service_day().date().format("%Y-%m-%d").to_string(),
            weekday: data.service_day().day().to_string(),
            local_time: now.to_string(),
            timezone: clock.timezone().name(),
            calendar,
            reason,
            active_trips: calendar_status.active_trips(),
            total_trips: calendar_status.total_trips(),
            stops: data.stops().count(),
            lines: data.lines().len(),
        })
    }))
}

pub fn lines_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "lines")
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(lines_handler)
}

pub fn stops_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "stops")
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(stops_handler)
}

pub fn status_route(
    shared: Arc<SharedSnapshot>,
    clock: Arc<CivilClock>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("api" / "status")
        .and(with_data(shared))
        .and(with_data(clock))
        .and_then(status_handler)
}
