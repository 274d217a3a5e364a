//! DST transition policies for wall-clock times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{HuddleError, Result};

/// Longest gap searched when shifting past a spring-forward transition.
/// Samoa skipped a whole calendar day in 2011.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Policy for wall-clock times that fall on a DST transition.
///
/// Ambiguous times (fall back) always take the earlier offset; the policy
/// only decides what happens inside a gap (spring forward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DstPolicy {
    /// Reject times inside the gap with `HuddleError::NonexistentLocalTime`.
    Reject,
    /// Read the time with the offset in force before the gap, which moves it
    /// forward by the gap length (02:30 becomes 03:30 on a one-hour gap).
    #[default]
    ShiftForward,
}

/// Attach `tz` to a naive local datetime according to `policy`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => match policy {
            DstPolicy::Reject => Err(nonexistent(tz, local)),
            DstPolicy::ShiftForward => shift_past_gap(tz, local),
        },
    }
}

fn shift_past_gap(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Tz>> {
    for back in 1..=MAX_GAP_MINUTES {
        if let Some(before) = tz
            .from_local_datetime(&(local - Duration::minutes(back)))
            .earliest()
        {
            let offset = before.offset().fix().local_minus_utc();
            let utc = local - Duration::seconds(i64::from(offset));
            return Ok(tz.from_utc_datetime(&utc));
        }
    }
    Err(nonexistent(tz, local))
}

fn nonexistent(tz: Tz, local: NaiveDateTime) -> HuddleError {
    HuddleError::NonexistentLocalTime {
        timezone: tz.name().to_string(),
        time: local.format("%Y-%m-%d %H:%M").to_string(),
    }
}
