//! # huddle-engine
//!
//! Scheduling core for a group-chat community: players register daily
//! availability windows in their own timezones, and the engine suggests the
//! UTC meeting times that the most players can attend. It also models events
//! and RSVPs and drives time-based reminders.
//!
//! Timezone input is freeform (`"cst"`, `"Pacific"`, `"europe/paris"`) and is
//! normalized to IANA identifiers resolved via `chrono-tz`, including DST.
//!
//! ## Modules
//!
//! - [`timezone`] — alias table and timezone normalization
//! - [`clock`] — freeform time-of-day parsing
//! - [`dst`] — DST gap/overlap policies
//! - [`convert`] — local ↔ UTC conversion against an injected [`Clock`]
//! - [`player`] — per-player availability records
//! - [`buckets`] — per-UTC-hour availability aggregation
//! - [`ranking`] — two-hour window ranking
//! - [`event`] — events, RSVPs and reminder offsets
//! - [`store`] — persistence traits, in-memory and SQLite stores
//! - [`reminder`] — reminder scheduler and expired-event cleanup
//! - [`render`] — chat-facing text
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use huddle_engine::{suggest_meeting_times, FixedClock, PlayerAvailability};
//!
//! let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
//! let players = vec![
//!     PlayerAvailability::from_input("ana", "UTC", "14:00", "16:00").unwrap(),
//!     PlayerAvailability::from_input("bo", "cet", "4pm", "6pm").unwrap(),
//! ];
//!
//! let best = suggest_meeting_times(&players, &clock);
//! assert_eq!(best[0].label, "14:00–16:00");
//! assert_eq!(best[0].count(), 2);
//! ```

pub mod buckets;
pub mod clock;
pub mod convert;
pub mod dst;
pub mod error;
pub mod event;
pub mod player;
pub mod ranking;
pub mod reminder;
pub mod render;
pub mod store;
pub mod timezone;

pub use buckets::{compute_hour_buckets, HourBuckets};
pub use clock::{parse_time_string, ClockTime};
pub use convert::{local_to_utc, utc_to_local, Clock, FixedClock, SystemClock};
pub use error::HuddleError;
pub use event::{parse_event_time, parse_reminder_hours, Event, NewEvent, Rsvp, RsvpResponse};
pub use player::PlayerAvailability;
pub use ranking::{rank_windows, suggest_meeting_times, RankedWindow};
pub use reminder::{Notification, Notifier, ReminderScheduler};
pub use store::{AvailabilityStore, EventStore, MemoryStore, SqliteStore};
pub use timezone::{normalize_timezone, CanonicalTimezone};
