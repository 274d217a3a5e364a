//! Human-readable text for chat replies.
//!
//! This is the only place error kinds are turned into user-facing wording.

use chrono::{DateTime, Utc};

use crate::convert::utc_to_local;
use crate::error::HuddleError;
use crate::event::{Event, Rsvp, RsvpResponse, EVENT_TIME_FORMAT};
use crate::ranking::RankedWindow;

/// Width of the longest bar in [`render_best_times`].
pub const BAR_WIDTH: usize = 15;

pub const NOT_ENOUGH_DATA: &str = "Not enough player data.";

const TIMEZONE_HELP: &str = "Timezone must be valid (e.g. `UTC`, `central`, `America/Chicago`)";
const TIME_HELP: &str = "Time must be readable (e.g. `16:00`, `4pm`, `0430`)";

/// Render ranked windows as a bar chart, one window per line.
///
/// Bars are scaled so the top window is [`BAR_WIDTH`] cells wide.
pub fn render_best_times(windows: &[RankedWindow]) -> String {
    if windows.is_empty() {
        return NOT_ENOUGH_DATA.to_string();
    }

    let max_count = windows.iter().map(RankedWindow::count).max().unwrap_or(0).max(1);
    let mut out = String::from("Best Event Times (UTC):\n\n");
    for window in windows {
        let count = window.count();
        let bars = "░".repeat(count * BAR_WIDTH / max_count);
        let noun = if count == 1 { "player" } else { "players" };
        out.push_str(&format!(
            "`{}` → {:<width$} {} {}\n",
            window.label,
            bars,
            count,
            noun,
            width = BAR_WIDTH
        ));
    }
    out
}

/// Translate an error into a message that tells the user what to fix.
pub fn user_message(err: &HuddleError) -> String {
    match err.root() {
        HuddleError::InvalidTimezone(raw) => {
            format!("Could not understand timezone '{raw}'.\n- {TIMEZONE_HELP}")
        }
        HuddleError::InvalidTimeFormat(raw) => {
            format!("Could not understand time '{raw}'.\n- {TIME_HELP}")
        }
        HuddleError::InvalidTimeRange { .. } => {
            format!("Hour must be between 0-23 and minute between 0-59.\n- {TIME_HELP}")
        }
        HuddleError::NonexistentLocalTime { time, timezone } => {
            format!("{time} is skipped by a daylight-saving change in {timezone}. Pick another time.")
        }
        HuddleError::InvalidEventTime(_) => {
            "Event not saved.\n- Time must be in UTC format: `YYYY-MM-DD HH:MM`".to_string()
        }
        HuddleError::EventInPast(_) => "Event not saved.\n- Time must be in the future.".to_string(),
        HuddleError::InvalidReminder(_) => {
            "Invalid reminder time. Use a number of hours between 1 and 168.".to_string()
        }
        HuddleError::EventNotFound(id) => format!("Event {id} does not exist."),
        HuddleError::PlayerNotFound(name) => format!("No availability saved for '{name}'."),
        HuddleError::Io(_)
        | HuddleError::Sqlite(_)
        | HuddleError::CorruptRow(_)
        | HuddleError::ConversionFailure { .. } => {
            "Something went wrong. Please try again later.".to_string()
        }
    }
}

/// Render one event for a viewer: UTC time, the viewer's local time, the RSVP
/// count and the viewer's own RSVP status.
pub fn render_event(
    event: &Event,
    viewer_tz: Option<&str>,
    rsvp_count: usize,
    viewer_rsvp: Option<&Rsvp>,
) -> String {
    let local = viewer_tz
        .and_then(|tz| local_time(event.starts_at, tz))
        .unwrap_or_else(|| "N/A".to_string());

    let status = match viewer_rsvp {
        Some(rsvp) if rsvp.response == RsvpResponse::Yes => match rsvp.reminder_minutes {
            Some(minutes) => format!(
                "You are RSVP'd, reminder {:.1} hours before.",
                f64::from(minutes) / 60.0
            ),
            None => "You are RSVP'd, no reminder set.".to_string(),
        },
        Some(_) => "You declined this event.".to_string(),
        None => "You have not RSVP'd.".to_string(),
    };

    let mut out = format!(
        "Event: {}\nUTC: {}\nYour Time: {}\n",
        event.title,
        event.starts_at.format(EVENT_TIME_FORMAT),
        local
    );
    if !event.description.is_empty() {
        out.push_str(&format!("Description: {}\n", event.description));
    }
    out.push_str(&format!("RSVPs: {rsvp_count}\n{status}"));
    out
}

fn local_time(instant: DateTime<Utc>, tz: &str) -> Option<String> {
    match utc_to_local(instant, tz) {
        Ok(local) => Some(local),
        Err(e) => {
            tracing::warn!(timezone = tz, error = %e, "could not show local event time");
            None
        }
    }
}
