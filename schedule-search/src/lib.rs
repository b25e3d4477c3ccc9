pub mod calendar;
pub mod clock;
pub mod departures;
pub mod direct_trips;
pub mod positions;
pub mod search_data;
pub mod time;

#[cfg(test)]
mod fixture;
