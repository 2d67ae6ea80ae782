//! Reminder time of day.
//!
//! Reminders are edited and stored in 12-hour display form ("07:00 AM").
//! Daily triggers need a 24-hour `(hour, minute)` pair. [`DisplayTime`] is the
//! validated bridge between the two.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TimeParseError;

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayTime {
    hour: u8,
    minute: u8,
}

impl DisplayTime {
    /// Build from a 24-hour pair.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeParseError> {
        if hour > 23 || minute > 59 {
            return Err(TimeParseError::OutOfRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Whether the time falls at or after noon.
    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }

    /// Hour on the 12-hour dial (1..=12).
    pub fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        // Fields are range-checked on construction.
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }

    /// First instant strictly after `after` at which this time of day occurs.
    pub fn next_occurrence(&self, after: NaiveDateTime) -> NaiveDateTime {
        let candidate = after.date().and_time(self.to_naive_time());
        if candidate > after {
            candidate
        } else {
            candidate + Duration::days(1)
        }
    }
}

impl FromStr for DisplayTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let (clock, period) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(clock), Some(period), None) => (clock, period),
            _ => return Err(TimeParseError::Shape(s.to_string())),
        };

        let (hour_str, minute_str) = clock
            .split_once(':')
            .ok_or_else(|| TimeParseError::Shape(s.to_string()))?;

        let hour = parse_digits(hour_str).ok_or_else(|| TimeParseError::Hour(s.to_string()))?;
        if !(1..=12).contains(&hour) {
            return Err(TimeParseError::Hour(s.to_string()));
        }
        if minute_str.len() != 2 {
            return Err(TimeParseError::Minute(s.to_string()));
        }
        let minute =
            parse_digits(minute_str).ok_or_else(|| TimeParseError::Minute(s.to_string()))?;
        if minute > 59 {
            return Err(TimeParseError::Minute(s.to_string()));
        }

        let hour = if period.eq_ignore_ascii_case("PM") {
            if hour < 12 {
                hour + 12
            } else {
                hour
            }
        } else if period.eq_ignore_ascii_case("AM") {
            if hour == 12 {
                0
            } else {
                hour
            }
        } else {
            return Err(TimeParseError::Period(s.to_string()));
        };

        Self::new(hour, minute)
    }
}

/// One or two ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = if self.is_pm() { "PM" } else { "AM" };
        write!(f, "{}:{:02} {}", self.hour12(), self.minute, period)
    }
}

impl TryFrom<String> for DisplayTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayTime> for String {
    fn from(value: DisplayTime) -> Self {
        value.to_string()
    }
}

/// Parse `"H:MM AM|PM"` into a 24-hour `(hour, minute)` pair.
pub fn parse_display_time(s: &str) -> Result<(u8, u8), TimeParseError> {
    let t: DisplayTime = s.parse()?;
    Ok((t.hour, t.minute))
}

/// Format a 24-hour pair as `"H:MM AM|PM"`.
pub fn format_display_time(hour: u32, minute: u32) -> Result<String, TimeParseError> {
    Ok(DisplayTime::new(hour, minute)?.to_string())
}
