/// `[h]h:mm:ss` times of `stop_times.txt`, anything unreadable is `Time::UNPARSABLE` rather than an error
pub mod time_format {
    use schedule_search::time::{parse_time_of_day, Time};
    use serde::{de, Deserializer};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TimeVisitor)
    }

    struct TimeVisitor;

    impl<'de> de::Visitor<'de> for TimeVisitor {
        type Value = Time;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "time formatted eg. \"[h]h:mm:ss\"")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(parse_time_of_day(s))
        }
    }
}

/// The weekday columns of `calendar.txt`:
/// 1 - Service is available for all Mondays in the date range.
/// 0 - Service is not available for Mondays in the date range.
pub mod service_available_format {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        u8::deserialize(deserializer).and_then(|flag| match flag {
            0 => Ok(false),
            1 => Ok(true),
            num => Err(de::Error::custom(format!(
                "Unknown service availability : {}",
                num
            ))),
        })
    }
}
