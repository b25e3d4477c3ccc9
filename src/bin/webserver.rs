use log::{error, info, warn};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;

use bus_radar::config::Config;
use bus_radar::endpoints;
use bus_radar::state::{self, SharedSnapshot};
use schedule_search::calendar::ServiceDay;
use schedule_search::clock::CivilClock;

/// Builds the timetable of `service_day` off the async threads and swaps it in
async fn reload(
    shared: Arc<SharedSnapshot>,
    config: Arc<Config>,
    service_day: ServiceDay,
) -> bool {
    let reloading = tokio::task::spawn_blocking(move || {
        state::refresh(&shared, service_day, |day| state::load(&config, day))
    });
    match reloading.await {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("Timetable reload of {} did not finish: {}", service_day, err);
            false
        }
    }
}

/// Moves on to the next service day's timetable once it starts, retrying every minute until it
/// is loaded
async fn keep_current(shared: Arc<SharedSnapshot>, clock: Arc<CivilClock>, config: Arc<Config>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let today = clock.now().day;
        if shared.service_day() != Some(today) {
            reload(shared.clone(), config.clone(), today).await;
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Arc::new(Config::from_env()?);
    let clock = Arc::new(CivilClock::system(config.timezone));
    let today = clock.now().day;
    info!("Timezone of record {}, service day {}", config.timezone.name(), today);

    let shared = Arc::new(SharedSnapshot::unavailable());
    if !reload(shared.clone(), config.clone(), today).await {
        warn!("Serving without a timetable, the API answers 503 until a reload succeeds");
    }
    tokio::spawn(keep_current(shared.clone(), clock.clone(), config.clone()));

    info!("Starting web server on {}", config.socket_addr());
    warp::serve(
        warp::fs::dir(config.static_dir.clone()).or(endpoints::api_routes(shared, clock)),
    )
    .run(config.socket_addr())
    .await;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run().await {
        error!("{}", err);
        std::process::exit(1);
    }
}
