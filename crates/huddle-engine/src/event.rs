//! Events, RSVPs and the validation of their user-typed fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HuddleError, Result};

/// Format used for event times everywhere users see or type them.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Personal reminder offsets accepted by [`parse_reminder_hours`], in hours.
pub const MIN_REMINDER_HOURS: f64 = 1.0;
pub const MAX_REMINDER_HOURS: f64 = 168.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub creator: String,
}

/// Fields supplied when creating or editing an event; the store assigns ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub creator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpResponse {
    Yes,
    No,
}

/// One player's answer to one event. Unique per `(event_id, player_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    pub event_id: u64,
    pub player_name: String,
    /// Chat handle used to mention the player, when known.
    #[serde(default)]
    pub contact: Option<String>,
    pub response: RsvpResponse,
    /// Personal reminder offset before the event starts, in minutes.
    #[serde(default)]
    pub reminder_minutes: Option<u32>,
}

impl Rsvp {
    /// True when a personal reminder is still pending for this RSVP.
    pub fn wants_reminder(&self) -> bool {
        self.response == RsvpResponse::Yes && self.reminder_minutes.is_some()
    }
}

/// Parse an event start time typed as `YYYY-MM-DD HH:MM` in UTC.
///
/// # Errors
/// `InvalidEventTime` for any other shape, `EventInPast` when the time is
/// not after `now`.
pub fn parse_event_time(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let starts_at = NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT)
        .map_err(|_| HuddleError::InvalidEventTime(raw.to_string()))?
        .and_utc();
    if starts_at <= now {
        return Err(HuddleError::EventInPast(raw.to_string()));
    }
    Ok(starts_at)
}

/// Parse a personal reminder offset typed in hours (decimals allowed).
///
/// Blank input means no reminder. Returns the offset in whole minutes.
///
/// # Errors
/// `InvalidReminder` when the input is not a number in `[1, 168]`.
///
/// # Examples
///
/// ```
/// use huddle_engine::parse_reminder_hours;
///
/// assert_eq!(parse_reminder_hours("1.5").unwrap(), Some(90));
/// assert_eq!(parse_reminder_hours("  ").unwrap(), None);
/// assert!(parse_reminder_hours("200").is_err());
/// ```
pub fn parse_reminder_hours(raw: &str) -> Result<Option<u32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let hours: f64 = raw
        .parse()
        .map_err(|_| HuddleError::InvalidReminder(raw.to_string()))?;
    if !(MIN_REMINDER_HOURS..=MAX_REMINDER_HOURS).contains(&hours) {
        return Err(HuddleError::InvalidReminder(raw.to_string()));
    }
    Ok(Some((hours * 60.0) as u32))
}
