//! Clock-time parsing -- freeform time-of-day strings to `(hour, minute)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HuddleError, Result};

/// A time of day with no date attached.
///
/// Always interpreted against "today" in some timezone at conversion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Build a clock time, rejecting hour > 23 or minute > 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(HuddleError::InvalidTimeRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = HuddleError;

    fn from_str(s: &str) -> Result<Self> {
        parse_time_string(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time_string(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a user-typed time of day.
///
/// Accepted shapes, after trimming and removing all whitespace
/// (case-insensitive):
///
/// - `H`, `HH` -- hour only
/// - `HMM`, `HHMM` -- last two digits are the minute
/// - `H:MM`, `HH:MM`
/// - any of the above followed by `am` / `pm` (12-hour clock)
///
/// # Errors
/// `HuddleError::InvalidTimeFormat` for an unrecognized shape,
/// `HuddleError::InvalidTimeRange` when the hour or minute is out of bounds.
/// Values are never clamped.
///
/// # Examples
///
/// ```
/// use huddle_engine::parse_time_string;
///
/// let t = parse_time_string("4:30 PM").unwrap();
/// assert_eq!((t.hour(), t.minute()), (16, 30));
/// assert_eq!(parse_time_string("0430").unwrap().to_string(), "04:30");
/// ```
pub fn parse_time_string(raw: &str) -> Result<ClockTime> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let format_err = || HuddleError::InvalidTimeFormat(raw.trim().to_string());

    let (body, meridiem) = if let Some(body) = cleaned.strip_suffix("am") {
        (body, Some(Meridiem::Am))
    } else if let Some(body) = cleaned.strip_suffix("pm") {
        (body, Some(Meridiem::Pm))
    } else {
        (cleaned.as_str(), None)
    };

    let (hour, minute) = split_digits(body).ok_or_else(format_err)?;

    let hour = match meridiem {
        None => hour,
        Some(_) if hour > 12 => return Err(HuddleError::InvalidTimeRange { hour, minute }),
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Am) => hour,
        Some(Meridiem::Pm) if hour == 12 => 12,
        Some(Meridiem::Pm) => hour + 12,
    };

    ClockTime::new(hour, minute)
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Split a bare time body into hour and minute digits. `None` if the shape
/// is not one of `H`, `HH`, `HMM`, `HHMM`, `H:MM`, `HH:MM`.
fn split_digits(body: &str) -> Option<(u32, u32)> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let (hour, minute) = match body.split_once(':') {
        Some((h, m)) => {
            if !(1..=2).contains(&h.len()) || m.len() != 2 {
                return None;
            }
            (h, m)
        }
        None if !all_digits(body) => return None,
        None => match body.len() {
            1 | 2 => (body, "0"),
            3 | 4 => body.split_at(body.len() - 2),
            _ => return None,
        },
    };

    if !all_digits(hour) || !all_digits(minute) {
        return None;
    }
    Some((hour.parse().ok()?, minute.parse().ok()?))
}
