use std::convert::TryInto;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Sub};

use serde::{de, ser, Deserialize, Serialize};

/// Duration in seconds, may be negative
/// # Examples
/// ```rust
/// use schedule_search::time::Duration;
/// assert_eq!(Duration::seconds(60), Duration::minutes(1));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    seconds: i32,
}

impl Duration {
    /// Construct a duration of a number of seconds
    pub fn seconds(seconds: i32) -> Duration {
        Duration { seconds }
    }

    /// Construct a duration of a number of minutes
    pub fn minutes(minutes: i32) -> Duration {
        Duration {
            seconds: minutes * 60,
        }
    }

    /// Convert to whole minutes, rounding towards negative infinity
    pub fn to_mins(&self) -> i32 {
        self.seconds.div_euclid(60)
    }

    /// Convert to seconds
    pub fn to_secs(&self) -> i32 {
        self.seconds
    }
}

impl AddAssign<Duration> for Duration {
    /// Add two `duration`s
    #[inline(always)]
    fn add_assign(&mut self, rhs: Duration) {
        self.seconds += rhs.seconds;
    }
}

impl Div<i32> for Duration {
    type Output = Duration;

    #[inline(always)]
    fn div(self, rhs: i32) -> Self::Output {
        Duration::seconds(self.seconds / rhs)
    }
}

/// Implementation of a local time within a service day, no attempt to handle leaps:
/// * time can go over 24 hours to enable the continuation of the day's schedule
/// * second precision
/// * the zero value doubles as the sentinel for an unparsable timetable entry, see `parse_time_of_day`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Time {
    seconds_since_midnight: u32,
}

impl Time {
    /// What `parse_time_of_day` gives for input it can't read. It is indistinguishable from a
    /// real midnight entry, callers that care must check the source string themselves.
    pub const UNPARSABLE: Time = Time {
        seconds_since_midnight: 0,
    };

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Time {
        Time {
            seconds_since_midnight: (hours * 60 + minutes) * 60 + seconds,
        }
    }

    pub fn from_secs(seconds_since_midnight: u32) -> Time {
        Time {
            seconds_since_midnight,
        }
    }

    pub fn to_secs(self) -> u32 {
        self.seconds_since_midnight
    }

    /// get the clock hour, it can be over 23
    fn hour(self) -> u32 {
        self.seconds_since_midnight / 60 / 60
    }

    /// get the minute of the hour
    fn minute(self) -> u8 {
        ((self.seconds_since_midnight / 60) % 60)
            .try_into()
            .expect("minute of the hour to fit in a byte")
    }

    /// get the seconds within the minute
    fn second(self) -> u8 {
        (self.seconds_since_midnight % 60)
            .try_into()
            .expect("second of the minute to fit in a byte")
    }

    /// Clock face `HH:MM`, service after midnight wraps back round to `00:xx`
    pub fn to_hhmm(self) -> String {
        format!("{:02}:{:02}", self.hour() % 24, self.minute())
    }
}

/// Total parser for timetable `[h]h:mm:ss` strings.
///
/// Never fails: anything which isn't three `:` separated unsigned numbers (surrounding whitespace
/// allowed) gives `Time::UNPARSABLE`. Unlike `Time::from_str` the components are not range checked,
/// `08:75:00` is read as 09:15:00 and hours past 23 are kept for post-midnight service.
pub fn parse_time_of_day(s: &str) -> Time {
    let mut parts = s.split(':');
    let hms = (parts.next(), parts.next(), parts.next(), parts.next());
    let (hh, mm, ss) = match hms {
        (Some(hh), Some(mm), Some(ss), None) => (hh, mm, ss),
        _ => return Time::UNPARSABLE,
    };
    let component = |part: &str| part.trim().parse::<u32>().ok();
    let seconds = component(hh)
        .zip(component(mm))
        .zip(component(ss))
        .and_then(|((h, m), s)| {
            h.checked_mul(3600)?
                .checked_add(m.checked_mul(60)?)?
                .checked_add(s)
        });
    seconds.map(Time::from_secs).unwrap_or(Time::UNPARSABLE)
}

/// For `#[serde(serialize_with)]` on times shown to riders, see `Time::to_hhmm`
pub fn serialize_hhmm<S>(time: &Time, serializer: S) -> Result<S::Ok, S::Error>
where
    S: ser::Serializer,
{
    serializer.serialize_str(&time.to_hhmm())
}

impl ser::Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        self.seconds_since_midnight.serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        de::Deserialize::deserialize(deserializer).map(|seconds_since_midnight| Time {
            seconds_since_midnight,
        })
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    /// Add a duration to a time, saturates at midnight rather than rolling over to yesterday
    #[inline(always)]
    fn add(self, rhs: Duration) -> Self::Output {
        let time: i64 = self.seconds_since_midnight.into();
        let duration: i64 = rhs.seconds.into();
        Time {
            seconds_since_midnight: (time + duration).max(0).try_into().unwrap_or(u32::MAX),
        }
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    /// Subtract two `Time`s, returning the `Duration` between. This assumes
    /// both `Time`s are in the same service day.
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Duration::seconds(self.seconds_since_midnight as i32 - rhs.seconds_since_midnight as i32)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Strict parse, for times typed in by people rather than read from the timetable
/// # String representations
/// ```rust
/// use schedule_search::time::Time;
/// let time: Time = "0:00:00".parse().unwrap();
/// let time: Time = "09:00:00".parse().unwrap();
/// let time: Time = "23:59:59".parse().unwrap();
/// let time: Time = "25:00:00".parse().unwrap();
/// ```
impl std::str::FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        let (hh, mm, ss) = if s.len() == 8 {
            if s[2] != b':' || s[5] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..2], &s[3..5], &s[6..8])
        } else if s.len() == 7 {
            if s[1] != b':' || s[4] != b':' {
                return Err(TimeParseError::InvalidFormat);
            }
            (&s[0..1], &s[2..4], &s[5..7])
        } else {
            return Err(TimeParseError::InvalidFormat);
        };
        use std::str::from_utf8;
        let hours: u32 = from_utf8(hh)?.parse()?;
        let minutes: u32 = from_utf8(mm)?.parse()?;
        let seconds: u32 = from_utf8(ss)?.parse()?;
        if seconds > 59 || minutes > 59 {
            Err(TimeParseError::TooManySecondsOrMinutes)?;
        }
        Ok(Time {
            seconds_since_midnight: hours * 60 * 60 + minutes * 60 + seconds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    InvalidFormat,
    TooManySecondsOrMinutes,
    ParseIntError(std::num::ParseIntError),
}

impl From<std::num::ParseIntError> for TimeParseError {
    fn from(err: std::num::ParseIntError) -> TimeParseError {
        TimeParseError::ParseIntError(err)
    }
}

impl std::convert::From<std::str::Utf8Error> for TimeParseError {
    fn from(_err: std::str::Utf8Error) -> TimeParseError {
        TimeParseError::InvalidFormat
    }
}

impl fmt::Display for TimeParseError {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeParseError::*;
        match self {
            InvalidFormat => write!(f, "Time should use format eg. 23:59:59"),
            TooManySecondsOrMinutes => write!(f, "Maximum minutes or seconds is 59"),
            ParseIntError(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TimeParseError {}

#[cfg(test)]
mod test {
    use super::{parse_time_of_day, Duration, Time};

    #[test]
    fn hms_times() {
        assert_eq!(Time::from_hms(12, 59, 59), "12:59:59".parse().unwrap());
    }

    #[test]
    fn subtract_times() {
        assert_eq!(
            "12:00:15".parse::<Time>().unwrap() - "12:00:00".parse::<Time>().unwrap(),
            Duration::seconds(15)
        );
        assert_eq!(
            "12:00:00".parse::<Time>().unwrap() - "12:00:15".parse::<Time>().unwrap(),
            Duration::seconds(-15)
        );
    }

    #[test]
    fn parse_and_to_string() {
        assert_eq!("00:00:00".parse::<Time>().unwrap().to_string(), "00:00:00");
        assert_eq!("23:59:59".parse::<Time>().unwrap().to_string(), "23:59:59");
        assert_eq!("25:00:00".parse::<Time>().unwrap().to_string(), "25:00:00");
        assert_eq!("5:00:00".parse::<Time>().unwrap().to_string(), "05:00:00");
    }

    #[test]
    fn invalid_parses() {
        assert!("".parse::<Time>().is_err());
        assert!("%%:%%:%%".parse::<Time>().is_err());
        assert!("00:00:0".parse::<Time>().is_err());
        assert!("00:00:60".parse::<Time>().is_err());
        assert!("00100100".parse::<Time>().is_err());
    }

    #[test]
    fn time_of_day_reads_timetable_times() {
        assert_eq!(parse_time_of_day("08:00:00").to_secs(), 28800);
        assert_eq!(parse_time_of_day("8:05:30").to_secs(), 29130);
        assert_eq!(parse_time_of_day(" 08:00:00 ").to_secs(), 28800);
        assert_eq!(parse_time_of_day("25:10:00").to_secs(), 90600);
        assert_eq!(parse_time_of_day("08:75:00").to_secs(), 33300);
    }

    #[test]
    fn time_of_day_is_total() {
        for garbage in &[
            "",
            ":",
            "::",
            "08:00",
            "08:00:00:00",
            "ab:cd:ef",
            "-1:00:00",
            "08:-5:00",
            "1.5:00:00",
            "99999999:00:00",
            "🚌:🚌:🚌",
        ] {
            assert_eq!(parse_time_of_day(garbage), Time::UNPARSABLE, "{:?}", garbage);
        }
    }

    #[test]
    fn clock_face_wraps_after_midnight() {
        assert_eq!(Time::from_hms(8, 5, 59).to_hhmm(), "08:05");
        assert_eq!(Time::from_hms(24, 30, 0).to_hhmm(), "00:30");
        assert_eq!(Time::from_hms(26, 0, 0).to_hhmm(), "02:00");
    }

    #[test]
    fn waits_round_down_to_whole_minutes() {
        assert_eq!(Duration::seconds(119).to_mins(), 1);
        assert_eq!(Duration::seconds(60).to_mins(), 1);
        assert_eq!(Duration::seconds(59).to_mins(), 0);
    }
}
