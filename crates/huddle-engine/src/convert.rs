//! Local ↔ UTC conversion of clock times.
//!
//! A [`ClockTime`] has no date, so converting it to UTC means reading it
//! against "today" in the subject timezone. "Today" comes from an injected
//! [`Clock`] so the conversion is reproducible under test; with
//! [`SystemClock`] the same inputs can map to a different UTC hour on either
//! side of a DST transition.

use chrono::{DateTime, NaiveTime, Utc};

use crate::clock::{parse_time_string, ClockTime};
use crate::dst::{resolve_local, DstPolicy};
use crate::error::{HuddleError, Result};
use crate::timezone::{normalize_timezone, CanonicalTimezone};

const LOCAL_TO_UTC: &str = "local time to UTC";
const UTC_TO_LOCAL: &str = "UTC to local time";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Convert a user-typed local time in a user-typed timezone to a UTC instant
/// on today's date in that zone.
///
/// # Errors
/// `HuddleError::ConversionFailure` wrapping `InvalidTimezone`,
/// `InvalidTimeFormat` or `InvalidTimeRange`. Use [`HuddleError::root`] to get
/// the specific cause.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Timelike, Utc};
/// use huddle_engine::{local_to_utc, FixedClock};
///
/// let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
/// let utc = local_to_utc("4pm", "central", &clock).unwrap();
/// assert_eq!(utc.hour(), 22); // CST is UTC-6 in January
/// ```
pub fn local_to_utc(raw_time: &str, tz_raw: &str, clock: &dyn Clock) -> Result<DateTime<Utc>> {
    let convert = || -> Result<DateTime<Utc>> {
        let tz = normalize_timezone(tz_raw)?;
        let time = parse_time_string(raw_time)?;
        clock_time_to_utc(time, tz, clock, DstPolicy::default())
    };
    convert().map_err(|e| e.during(LOCAL_TO_UTC))
}

/// Typed core of [`local_to_utc`] for already-validated inputs.
pub fn clock_time_to_utc(
    time: ClockTime,
    tz: CanonicalTimezone,
    clock: &dyn Clock,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    let today = clock.now().with_timezone(&tz.tz()).date_naive();
    let wall = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).ok_or(
        HuddleError::InvalidTimeRange {
            hour: time.hour(),
            minute: time.minute(),
        },
    )?;
    let local = resolve_local(tz.tz(), today.and_time(wall), policy)?;
    Ok(local.with_timezone(&Utc))
}

/// Format a UTC instant as zero-padded `HH:MM` wall-clock time in a
/// user-typed timezone.
///
/// # Errors
/// `HuddleError::ConversionFailure` wrapping `InvalidTimezone`.
pub fn utc_to_local(instant: DateTime<Utc>, tz_raw: &str) -> Result<String> {
    let tz = normalize_timezone(tz_raw).map_err(|e| e.during(UTC_TO_LOCAL))?;
    Ok(instant.with_timezone(&tz.tz()).format("%H:%M").to_string())
}
