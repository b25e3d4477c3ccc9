//! Reading the static timetable published as GTFS tables
pub mod db;
pub mod model;
pub mod time;
