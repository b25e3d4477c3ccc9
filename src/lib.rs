pub mod config;
pub mod endpoints;
pub mod gtfs;
pub mod state;
