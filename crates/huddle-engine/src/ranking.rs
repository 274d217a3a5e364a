//! Rank two-hour UTC windows by how many distinct players can attend.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::buckets::{compute_hour_buckets, HourBuckets, HOURS_PER_DAY};
use crate::convert::Clock;
use crate::player::PlayerAvailability;

/// Maximum number of windows returned by [`rank_windows`].
pub const MAX_RANKED_WINDOWS: usize = 6;

/// A two-hour UTC window and the players available in either of its hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedWindow {
    /// First UTC hour covered by the window.
    pub start_hour: usize,
    /// `"HH:00–HH:00"`, end boundary two hours after the start.
    pub label: String,
    pub players: BTreeSet<String>,
}

impl RankedWindow {
    pub fn count(&self) -> usize {
        self.players.len()
    }
}

/// Build the window label for a start hour, e.g. `23` → `"23:00–01:00"`.
pub fn window_label(start_hour: usize) -> String {
    let start = start_hour % HOURS_PER_DAY;
    format!("{:02}:00–{:02}:00", start, (start + 2) % HOURS_PER_DAY)
}

/// Rank the 24 overlapping two-hour windows by distinct player count.
///
/// Window `h` is the union of buckets `h` and `h + 1` (mod 24). Windows are
/// sorted by count descending with ties kept in ascending hour order, and
/// the first [`MAX_RANKED_WINDOWS`] are returned. When fewer windows have
/// players, the earliest empty windows pad the result. Buckets with no
/// players at all give an empty result.
pub fn rank_windows(buckets: &HourBuckets) -> Vec<RankedWindow> {
    if buckets.is_empty() {
        return Vec::new();
    }

    let mut windows: Vec<RankedWindow> = (0..HOURS_PER_DAY)
        .map(|hour| RankedWindow {
            start_hour: hour,
            label: window_label(hour),
            players: buckets
                .players(hour)
                .union(buckets.players(hour + 1))
                .cloned()
                .collect(),
        })
        .collect();

    // `sort_by` is stable: equal counts stay in ascending hour order.
    windows.sort_by(|a, b| b.count().cmp(&a.count()));
    windows.truncate(MAX_RANKED_WINDOWS);
    windows
}

/// Aggregate availability records and rank the resulting windows.
pub fn suggest_meeting_times(records: &[PlayerAvailability], clock: &dyn Clock) -> Vec<RankedWindow> {
    rank_windows(&compute_hour_buckets(records, clock))
}
