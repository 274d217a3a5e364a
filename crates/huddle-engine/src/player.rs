//! Per-player availability records.

use serde::{Deserialize, Serialize};

use crate::clock::{parse_time_string, ClockTime};
use crate::error::Result;
use crate::timezone::normalize_timezone;

/// A player's recurring daily availability window in their own timezone.
///
/// One record per player name; a new submission replaces the old one.
/// `timezone` is kept as a string because stored records may predate a
/// timezone database update, so it is re-validated when aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAvailability {
    pub player_name: String,
    pub timezone: String,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl PlayerAvailability {
    /// Validate raw form input and build a record holding the canonical
    /// timezone name.
    ///
    /// # Errors
    /// The first of `InvalidTimezone`, `InvalidTimeFormat` or
    /// `InvalidTimeRange` encountered, checked in that order.
    pub fn from_input(player_name: &str, tz_raw: &str, start_raw: &str, end_raw: &str) -> Result<Self> {
        let timezone = normalize_timezone(tz_raw)?;
        let start = parse_time_string(start_raw)?;
        let end = parse_time_string(end_raw)?;
        Ok(Self {
            player_name: player_name.trim().to_string(),
            timezone: timezone.name().to_string(),
            start,
            end,
        })
    }
}
