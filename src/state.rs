//! The snapshot being served, replaced wholesale when the service day changes

use log::{error, info, warn};
use std::sync::{Arc, PoisonError, RwLock};

use schedule_search::calendar::ServiceDay;
use schedule_search::search_data::Snapshot;

use crate::config::Config;
use crate::gtfs::db::{self, LoadError};

/// The current snapshot, or none while the timetable couldn't be loaded.
///
/// Readers take their own `Arc` and never hold the lock while answering a query.
#[derive(Default)]
pub struct SharedSnapshot {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: Snapshot) -> SharedSnapshot {
        SharedSnapshot {
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    /// Nothing to serve, after a fatal load error
    pub fn unavailable() -> SharedSnapshot {
        SharedSnapshot::default()
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, snapshot: Snapshot) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(snapshot));
    }

    /// Back to serving nothing
    pub fn clear(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Service day of the snapshot being served
    pub fn service_day(&self) -> Option<ServiceDay> {
        self.current().map(|snapshot| snapshot.service_day())
    }
}

/// Loads the snapshot of `service_day` as configured
pub fn load(config: &Config, service_day: ServiceDay) -> Result<Snapshot, LoadError> {
    if config.snapshot_cache {
        db::load_data_cached(&config.gtfs_dir, service_day)
    } else {
        db::load_data(&config.gtfs_dir, service_day)
    }
}

/// Replaces the snapshot with the one `load` builds for `service_day`. On failure a snapshot of
/// another day stops being served, one of `service_day` itself carries on.
pub fn refresh<F>(shared: &SharedSnapshot, service_day: ServiceDay, load: F) -> bool
where
    F: FnOnce(ServiceDay) -> Result<Snapshot, LoadError>,
{
    match load(service_day) {
        Ok(snapshot) => {
            info!("Now serving the timetable of {}", service_day);
            shared.replace(snapshot);
            true
        }
        Err(err) => {
            error!("Failed to load the timetable of {}: {}", service_day, err);
            if let Some(served) = shared.service_day().filter(|&served| served != service_day) {
                warn!("Timetable of {} withdrawn", served);
                shared.clear();
            }
            false
        }
    }
}
