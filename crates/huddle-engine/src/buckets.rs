//! Bin per-player local availability windows into UTC hour-of-day buckets.
//!
//! Each player's window is converted to a start and end UTC hour (minutes are
//! dropped) and the player is added to every hour from start up to, but not
//! including, end. Windows that cross midnight UTC wrap around: start 22 and
//! end 3 covers hours 22, 23, 0, 1 and 2.

use std::collections::BTreeSet;

use chrono::Timelike;
use serde::Serialize;

use crate::convert::{clock_time_to_utc, Clock};
use crate::dst::DstPolicy;
use crate::error::Result;
use crate::player::PlayerAvailability;
use crate::timezone::normalize_timezone;

pub const HOURS_PER_DAY: usize = 24;

/// Distinct player names available during each UTC hour of the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourBuckets {
    hours: [BTreeSet<String>; HOURS_PER_DAY],
    /// Players whose record could not be converted and was left out.
    skipped: Vec<String>,
}

impl HourBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Players available during UTC hour `hour` (taken modulo 24).
    pub fn players(&self, hour: usize) -> &BTreeSet<String> {
        &self.hours[hour % HOURS_PER_DAY]
    }

    /// Mark `player` available for UTC hours `start..end`, wrapping at
    /// midnight. `start == end` adds nothing.
    pub fn add_window(&mut self, player: &str, start: usize, end: usize) {
        let end = end % HOURS_PER_DAY;
        let mut hour = start % HOURS_PER_DAY;
        while hour != end {
            self.hours[hour].insert(player.to_string());
            hour = (hour + 1) % HOURS_PER_DAY;
        }
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// True when no hour holds any player.
    pub fn is_empty(&self) -> bool {
        self.hours.iter().all(BTreeSet::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<String>)> {
        self.hours.iter().enumerate()
    }
}

/// Aggregate availability records into per-UTC-hour player sets.
///
/// A record whose timezone no longer validates (or whose conversion fails
/// for any other reason) is skipped and reported in
/// [`HourBuckets::skipped`]; the remaining records are still aggregated.
///
/// A window whose start and end land on the same UTC hour contributes no
/// hours. Clock times carry no date, so a window can never span a full day.
pub fn compute_hour_buckets(records: &[PlayerAvailability], clock: &dyn Clock) -> HourBuckets {
    let mut buckets = HourBuckets::new();

    for record in records {
        match utc_hours(record, clock) {
            Ok((start, end)) => buckets.add_window(&record.player_name, start, end),
            Err(e) => {
                tracing::warn!(
                    player = %record.player_name,
                    timezone = %record.timezone,
                    error = %e,
                    "skipping availability record"
                );
                buckets.skipped.push(record.player_name.clone());
            }
        }
    }

    buckets
}

fn utc_hours(record: &PlayerAvailability, clock: &dyn Clock) -> Result<(usize, usize)> {
    let tz = normalize_timezone(&record.timezone)?;
    let start = clock_time_to_utc(record.start, tz, clock, DstPolicy::default())?;
    let end = clock_time_to_utc(record.end, tz, clock, DstPolicy::default())?;
    Ok((start.hour() as usize, end.hour() as usize))
}
