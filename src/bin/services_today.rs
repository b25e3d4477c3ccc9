use log::error;
use std::error::Error;

use bus_radar::config::Config;
use bus_radar::state;
use schedule_search::calendar::CalendarStatus;
use schedule_search::clock::CivilClock;
use schedule_search::time::Time;

/// Calendar filter diagnostics, then the vehicles running now or at the `[h]h:mm:ss` given
fn run() -> Result<(), Box<dyn Error>> {
    let at: Option<Time> = std::env::args().nth(1).map(|arg| arg.parse()).transpose()?;
    let config = Config::from_env()?;
    let now = CivilClock::system(config.timezone).now();
    let data = state::load(&config, now.day)?;

    println!("Service day {}", data.service_day());
    match data.calendar_status() {
        CalendarStatus::Applied {
            active_trips,
            total_trips,
        } => println!("Calendar applied, {} of {} trips run today", active_trips, total_trips),
        CalendarStatus::FailedOpen {
            reason,
            total_trips,
            ..
        } => println!("Calendar not applied ({}), all {} trips run", reason, total_trips),
    }
    println!("{} lines, {} stop names", data.lines().len(), data.unique_stops().len());

    let time = at.unwrap_or(now.time);
    let vehicles = data.vehicle_positions(time);
    println!("{} vehicles running at {}", vehicles.len(), time);
    for vehicle in vehicles {
        let position = vehicle.position();
        println!(
            "{:>4} {:<30} {:>3.0}% ({:.5}, {:.5}) trip {}",
            vehicle.line,
            vehicle.destination,
            vehicle.pct * 100.0,
            position.lat(),
            position.lng(),
            vehicle.trip_id
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
