use log::error;
use std::error::Error;

use bus_radar::config::Config;
use bus_radar::state;
use schedule_search::clock::CivilClock;

fn run() -> Result<(), Box<dyn Error>> {
    let stop_name = std::env::args()
        .nth(1)
        .ok_or("usage: departing_soon <stop name>")?;
    let config = Config::from_env()?;
    let now = CivilClock::system(config.timezone).now();
    let data = state::load(&config, now.day)?;

    let departures = data.stop_schedule(&stop_name, now.time);
    if departures.is_empty() {
        println!("No more departures from {:?} today", stop_name);
    }
    for departure in departures {
        println!(
            "{} {:>4} {:<30} {:>3} min",
            departure.departure_time.to_hhmm(),
            departure.line,
            departure.destination,
            departure.wait
        );
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}
