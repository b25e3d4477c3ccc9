//! The civil time source of record. Every time sensitive query is handed a `LocalTime` produced
//! here rather than reading the host's clock or timezone itself.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::calendar::ServiceDay;
use crate::time::Time;

pub trait Clock: Send + Sync {
    fn utc_now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always the same instant, for tests and for asking "what if" from the command line
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn utc_now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Service day and time of day in the timezone of record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub day: ServiceDay,
    pub time: Time,
}

impl LocalTime {
    pub fn at(instant: DateTime<Utc>, timezone: Tz) -> LocalTime {
        let date_time = instant.with_timezone(&timezone);
        LocalTime {
            day: ServiceDay::new(date_time.naive_local().date()),
            time: Time::from_hms(date_time.hour(), date_time.minute(), date_time.second()),
        }
    }
}

/// A clock bound to the timezone of record
pub struct CivilClock {
    timezone: Tz,
    clock: Box<dyn Clock>,
}

impl CivilClock {
    pub fn new(timezone: Tz, clock: impl Clock + 'static) -> CivilClock {
        CivilClock {
            timezone,
            clock: Box::new(clock),
        }
    }

    pub fn system(timezone: Tz) -> CivilClock {
        Self::new(timezone, SystemClock)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn now(&self) -> LocalTime {
        LocalTime::at(self.clock.utc_now(), self.timezone)
    }
}
