use chrono_tz::Tz;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("PORT should be a port number, not {0:?}")]
    Port(String),
    #[error("BIND_ADDR should be an IP address, not {0:?}")]
    BindAddr(String),
    #[error("TIMEZONE should be an IANA timezone name like Europe/Paris: {0}")]
    Timezone(String),
}

/// Process configuration, from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    /// Directory holding the timetable tables
    pub gtfs_dir: PathBuf,
    /// Directory served as the web site
    pub static_dir: PathBuf,
    /// Timezone of record, the service day and time of day of every query are taken in it
    pub timezone: Tz,
    /// Keep a copy of the built snapshot next to the tables
    pub snapshot_cache: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Config, ConfigError> {
        let var = |name: &str, default: &str| {
            vars.get(name)
                .cloned()
                .unwrap_or_else(|| default.to_owned())
        };

        let port = var("PORT", "5000");
        let bind_addr = var("BIND_ADDR", "0.0.0.0");
        let timezone = var("TIMEZONE", "Europe/Paris");
        Ok(Config {
            port: port.parse().map_err(|_| ConfigError::Port(port.clone()))?,
            bind_addr: bind_addr
                .parse()
                .map_err(|_| ConfigError::BindAddr(bind_addr.clone()))?,
            gtfs_dir: var("GTFS_DIR", "data").into(),
            static_dir: var("STATIC_DIR", "templates").into(),
            timezone: timezone.parse().map_err(ConfigError::Timezone)?,
            snapshot_cache: matches!(
                var("SNAPSHOT_CACHE", "").to_lowercase().as_str(),
                "1" | "true"
            ),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
