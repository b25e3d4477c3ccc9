//! Calendar filter: which services run on the service day the snapshot is built for

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::search_data::ServiceId;

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Day {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Monday => "mon",
            Self::Tuesday => "tue",
            Self::Wednesday => "wed",
            Self::Thursday => "thu",
            Self::Friday => "fri",
            Self::Saturday => "sat",
            Self::Sunday => "sun",
        })
    }
}

/// A civil date in the timezone of record, with its weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDay {
    date: NaiveDate,
    day: Day,
}

impl ServiceDay {
    pub fn new(date: NaiveDate) -> ServiceDay {
        ServiceDay {
            date,
            day: date.weekday().into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> Day {
        self.day
    }

    /// The date as the `YYYYMMDD` number used by calendar tables
    pub fn date_number(&self) -> u32 {
        self.date.year() as u32 * 10_000 + self.date.month() * 100 + self.date.day()
    }
}

impl fmt::Display for ServiceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.date.format("%Y-%m-%d"), self.day)
    }
}

/// One row of the calendar table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub service_id: ServiceId,
    /// YYYYMMDD, inclusive
    pub start_date: u32,
    /// YYYYMMDD, inclusive
    pub end_date: u32,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl CalendarEntry {
    pub fn runs_on_day(&self, day: Day) -> bool {
        match day {
            Day::Monday => self.monday,
            Day::Tuesday => self.tuesday,
            Day::Wednesday => self.wednesday,
            Day::Thursday => self.thursday,
            Day::Friday => self.friday,
            Day::Saturday => self.saturday,
            Day::Sunday => self.sunday,
        }
    }

    pub fn runs_on(&self, service_day: ServiceDay) -> bool {
        let today = service_day.date_number();
        self.start_date <= today && today <= self.end_date && self.runs_on_day(service_day.day())
    }
}

/// The services running on one service day.
///
/// Without a usable calendar the filter fails open: every service counts as running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveServices {
    All { reason: String },
    Only(HashSet<ServiceId>),
}

impl ActiveServices {
    pub fn from_calendar<'c>(
        calendar: impl IntoIterator<Item = &'c CalendarEntry>,
        service_day: ServiceDay,
    ) -> ActiveServices {
        ActiveServices::Only(
            calendar
                .into_iter()
                .filter(|entry| entry.runs_on(service_day))
                .map(|entry| entry.service_id.clone())
                .collect(),
        )
    }

    pub fn all(reason: impl fmt::Display) -> ActiveServices {
        ActiveServices::All {
            reason: reason.to_string(),
        }
    }

    pub fn runs(&self, service_id: &str) -> bool {
        match self {
            ActiveServices::All { .. } => true,
            ActiveServices::Only(services) => services.contains(service_id),
        }
    }

    pub fn is_filtering(&self) -> bool {
        matches!(self, ActiveServices::Only(_))
    }
}

/// How the calendar filter went when the snapshot was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarStatus {
    Applied {
        active_trips: usize,
        total_trips: usize,
    },
    FailedOpen {
        reason: String,
        active_trips: usize,
        total_trips: usize,
    },
}

impl CalendarStatus {
    pub fn active_trips(&self) -> usize {
        match self {
            CalendarStatus::Applied { active_trips, .. } => *active_trips,
            CalendarStatus::FailedOpen { active_trips, .. } => *active_trips,
        }
    }

    pub fn total_trips(&self) -> usize {
        match self {
            CalendarStatus::Applied { total_trips, .. } => *total_trips,
            CalendarStatus::FailedOpen { total_trips, .. } => *total_trips,
        }
    }
}
