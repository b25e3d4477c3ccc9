use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

use schedule_search::calendar::{ActiveServices, CalendarEntry, ServiceDay};
use schedule_search::search_data::Snapshot;

use crate::gtfs::model::*;

#[derive(Error, Debug)]
pub enum LoadError {
    /// A timetable table is missing or has a row which can't be read
    #[error("could not read {table}: {source}")]
    Table {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{table} has no {column} column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("could not decode the snapshot cache: {0}")]
    CacheRead(#[from] rmp_serde::decode::Error),
    #[error("could not encode the snapshot cache: {0}")]
    CacheWrite(#[from] rmp_serde::encode::Error),
    #[error("snapshot cache: {0}")]
    CacheFile(#[from] std::io::Error),
}

const CALENDAR_COLUMNS: &[&str] = &[
    "service_id",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "start_date",
    "end_date",
];
const STOP_COLUMNS: &[&str] = &["stop_id", "stop_name"];
const ROUTE_COLUMNS: &[&str] = &["route_id"];
const TRIP_COLUMNS: &[&str] = &["route_id", "service_id", "trip_id"];
const STOP_TIME_COLUMNS: &[&str] = &[
    "trip_id",
    "arrival_time",
    "departure_time",
    "stop_id",
    "stop_sequence",
];

pub struct GTFSSource {
    dir_path: PathBuf,
}

impl GTFSSource {
    pub fn new(dir_path: &Path) -> GTFSSource {
        GTFSSource {
            dir_path: dir_path.to_owned(),
        }
    }

    fn open_csv(&self, table: &'static str) -> Result<csv::Reader<File>, LoadError> {
        let path = self.dir_path.join(table);
        info!("Opening {}", path.display());
        csv::Reader::from_path(path).map_err(|source| LoadError::Table { table, source })
    }

    /// Hands each row of the table to `f`, stopping at the first row which can't be read. An empty
    /// table, or one without all of `columns` in its header, is an error.
    fn for_each_record<T, F>(
        &self,
        table: &'static str,
        columns: &[&'static str],
        mut f: F,
    ) -> Result<usize, LoadError>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        let mut rdr = self.open_csv(table)?;
        let headers = rdr
            .headers()
            .map_err(|source| LoadError::Table { table, source })?;
        if let Some(&column) = columns
            .iter()
            .find(|column| !headers.iter().any(|header| header.trim() == **column))
        {
            return Err(LoadError::MissingColumn { table, column });
        }
        let mut count = 0;
        for result in rdr.deserialize() {
            let record: T = result.map_err(|source| LoadError::Table { table, source })?;
            f(record);
            count += 1;
        }
        info!("{} rows of {}", count, table);
        Ok(count)
    }

    pub fn get_calendar(&self) -> Result<Vec<CalendarEntry>, LoadError> {
        let mut entries: Vec<CalendarEntry> = vec![];
        self.for_each_record("calendar.txt", CALENDAR_COLUMNS, |calendar: Calendar| {
            entries.push(calendar.into())
        })?;
        Ok(entries)
    }

    /// The services running on `service_day`. When the calendar can't be read every service is
    /// taken to be running.
    pub fn active_services(&self, service_day: ServiceDay) -> ActiveServices {
        match self.get_calendar() {
            Ok(calendar) => ActiveServices::from_calendar(&calendar, service_day),
            Err(err) => {
                warn!("Calendar not applied, all trips considered active: {}", err);
                ActiveServices::all(err)
            }
        }
    }

    /// Reads every table and builds the schedule index of `service_day`
    pub fn build_snapshot(&self, service_day: ServiceDay) -> Result<Snapshot, LoadError> {
        info!("Building the timetable of {}", service_day);
        let mut builder = Snapshot::builder(service_day, self.active_services(service_day));

        let mut unlocated = 0;
        self.for_each_record("stops.txt", STOP_COLUMNS, |stop: Stop| match stop.position() {
            Some(position) => builder.add_stop(stop.stop_id, stop.stop_name, position),
            None => unlocated += 1,
        })?;
        if unlocated > 0 {
            info!("{} stops without coordinates skipped", unlocated);
        }

        self.for_each_record("routes.txt", ROUTE_COLUMNS, |route: Route| {
            builder.add_route(
                route.route_id,
                route.route_short_name,
                route.route_long_name,
                route.route_color,
                route.route_text_color,
            )
        })?;

        self.for_each_record("trips.txt", TRIP_COLUMNS, |trip: Trip| {
            builder.add_trip(
                trip.trip_id,
                trip.route_id,
                trip.service_id,
                trip.trip_headsign,
            )
        })?;

        self.for_each_record("stop_times.txt", STOP_TIME_COLUMNS, |stop_time: StopTime| {
            builder.add_timetabled_stop(
                &stop_time.trip_id,
                stop_time.stop_sequence,
                stop_time.arrival_time,
                stop_time.departure_time,
                stop_time.stop_id,
            )
        })?;

        Ok(builder.build())
    }

    fn cache_path(&self, service_day: ServiceDay) -> PathBuf {
        self.dir_path
            .join(format!("cache-{}", service_day.date_number()))
    }

    pub fn load_cache(&self, service_day: ServiceDay) -> Result<Option<Snapshot>, LoadError> {
        let path = self.cache_path(service_day);
        if path.is_file() {
            let file = File::open(path)?;
            let data: Snapshot = rmp_serde::decode::from_read(file)?;
            Ok(Some(data).filter(|data| data.service_day() == service_day))
        } else {
            Ok(None)
        }
    }

    pub fn write_cache(&self, data: &Snapshot) -> Result<(), LoadError> {
        let mut file = File::create(self.cache_path(data.service_day()))?;
        rmp_serde::encode::write(&mut file, data)?;
        Ok(())
    }
}

/// Builds the snapshot of `service_day` from the tables in `gtfs_dir`
pub fn load_data(gtfs_dir: &Path, service_day: ServiceDay) -> Result<Snapshot, LoadError> {
    GTFSSource::new(gtfs_dir).build_snapshot(service_day)
}

/// As `load_data`, reusing a snapshot cached on disk for the same service day. Problems with the
/// cache are logged and otherwise ignored.
pub fn load_data_cached(gtfs_dir: &Path, service_day: ServiceDay) -> Result<Snapshot, LoadError> {
    let source = GTFSSource::new(gtfs_dir);
    match source.load_cache(service_day) {
        Ok(Some(data)) => {
            info!("Using the cached timetable of {}", service_day);
            return Ok(data);
        }
        Ok(None) => {}
        Err(err) => warn!("Ignoring the snapshot cache: {}", err),
    }
    let data = source.build_snapshot(service_day)?;
    if let Err(err) = source.write_cache(&data) {
        warn!("Snapshot not cached: {}", err);
    }
    Ok(data)
}
