use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of one coverage slot in minutes.
pub const SLOT_MINUTES: u16 = 15;

/// Minutes in a full day; also the largest valid [`TimeOfDay`] (`24:00`).
pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid time of day {input:?}, expected HH:MM")]
pub struct ParseTimeError {
    input: String,
}

/// A time of day stored as minutes since midnight.
///
/// Parsed from and rendered as `HH:MM` (24-hour). `24:00` is accepted so
/// closing times and rule ranges can name end-of-day.
///
/// # Example
///```
/// use shared::time::TimeOfDay;
/// let t: TimeOfDay = "09:30".parse().unwrap();
/// assert_eq!(t.minutes(), 570);
/// assert_eq!(t.to_string(), "09:30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError {
            input: s.to_owned(),
        };
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let hours: u16 = h.parse().map_err(|_| err())?;
        let minutes: u16 = m.parse().map_err(|_| err())?;
        if minutes >= 60 {
            return Err(err());
        }
        Self::from_minutes(hours * 60 + minutes).ok_or_else(err)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl utoipa::PartialSchema for TimeOfDay {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::schema::Object::with_type(utoipa::openapi::schema::Type::String).into()
    }
}

impl utoipa::ToSchema for TimeOfDay {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("TimeOfDay")
    }
}

/// Day-of-week index under the UI convention: 0 = Sunday .. 6 = Saturday.
///
/// Configuration (`closed_days`, reinforcement rule `days`) uses this
/// convention; chrono's Monday-based numbering never leaves this function.
pub fn ui_weekday(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Key identifying the calendar week a date belongs to: (ISO year, ISO week).
pub fn iso_week_key(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_hh_mm() {
        let t: TimeOfDay = "09:05".parse().unwrap();
        assert_eq!(t.minutes(), 545);
        assert_eq!(t.to_string(), "09:05");
    }

    #[test]
    fn accepts_end_of_day() {
        let t: TimeOfDay = "24:00".parse().unwrap();
        assert_eq!(t, TimeOfDay::END_OF_DAY);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "9", "24:01", "12:60", "ab:cd", "12-30"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn serde_round_trip() {
        let t: TimeOfDay = serde_json::from_str("\"17:45\"").unwrap();
        assert_eq!(t.minutes(), 17 * 60 + 45);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"17:45\"");
    }

    #[test]
    fn ui_weekday_is_sunday_based() {
        // 2025-01-05 is a Sunday, 2025-01-06 a Monday, 2025-01-11 a Saturday
        assert_eq!(ui_weekday(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()), 0);
        assert_eq!(ui_weekday(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()), 1);
        assert_eq!(ui_weekday(NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()), 6);
    }

    #[test]
    fn iso_week_key_spans_year_boundary() {
        // 2024-12-30 (Mon) and 2025-01-05 (Sun) share ISO week 2025-W01
        let monday = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(iso_week_key(monday), (2025, 1));
        assert_eq!(iso_week_key(monday), iso_week_key(sunday));
    }
}
