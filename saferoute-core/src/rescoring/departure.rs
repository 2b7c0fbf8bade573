use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Formats accepted for departure times without an offset
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Local day of week (0 = Sunday) and minute of day used for opening hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartureTime {
    day: u8,
    minute: u16,
}

impl DepartureTime {
    /// Panics on out-of-range values
    pub fn new(day: u8, hour: u8, minute: u8) -> Self {
        assert!(day <= 6 && hour <= 23 && minute <= 59, "invalid departure time");
        Self {
            day,
            minute: u16::from(hour) * 60 + u16::from(minute),
        }
    }

    pub fn day(self) -> u8 {
        self.day
    }

    pub fn minute_of_day(self) -> u16 {
        self.minute
    }

    /// Parses an ISO-8601 timestamp into local time of `time_zone`.
    ///
    /// Timestamps carrying an offset (or `Z`) are converted, naive ones are
    /// taken as already local.
    ///
    /// # Errors
    ///
    /// `Error::UnknownTimeZone` for an unknown IANA name and
    /// `Error::InvalidTimestamp` for unparseable input
    pub fn parse(input: &str, time_zone: &str) -> Result<Self, Error> {
        let tz = Tz::from_str_insensitive(time_zone)
            .map_err(|_| Error::UnknownTimeZone(time_zone.to_string()))?;
        let input = input.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::from_local(&datetime.with_timezone(&tz)));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(|naive| Self::from_local(&naive))
            .ok_or_else(|| Error::InvalidTimestamp(input.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_local<T: Datelike + Timelike>(local: &T) -> Self {
        Self {
            day: local.weekday().num_days_from_sunday() as u8,
            minute: (local.hour() * 60 + local.minute()) as u16,
        }
    }
}

impl std::fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        write!(
            f,
            "{} {:02}:{:02}",
            DAYS[usize::from(self.day)],
            self.minute / 60,
            self.minute % 60
        )
    }
}
