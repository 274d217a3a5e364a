//! Time-based event notifications.
//!
//! [`ReminderScheduler`] owns its store and notifier and is driven by
//! [`ReminderScheduler::tick`], which checks every event against the given
//! instant. [`ReminderScheduler::run`] repeats ticks at a fixed interval on
//! the calling thread until a stop flag is raised.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::convert::Clock;
use crate::error::Result;
use crate::event::Event;
use crate::store::EventStore;

/// Default polling interval of the scheduler.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

/// Personal reminders fire when the offset is within this many minutes of
/// the actual time left.
const PERSONAL_TOLERANCE_MINUTES: i64 = 1;

/// Longest single sleep in [`ReminderScheduler::run`], so a stop request is
/// noticed promptly.
const STOP_POLL: Duration = Duration::from_millis(250);

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Audience {
    /// Posted to the reminder channel without a mention.
    Channel,
    /// Posted to the reminder channel mentioning everyone.
    Everyone,
    /// Addressed to one player, by chat handle when known.
    Player {
        name: String,
        contact: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub event_id: u64,
    pub audience: Audience,
    pub text: String,
}

/// Delivery of notifications to the chat platform.
pub trait Notifier {
    fn send(&mut self, notification: &Notification) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn send(&mut self, notification: &Notification) -> Result<()> {
        (**self).send(notification)
    }
}

/// Fixed reminders posted to the whole group before every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupReminder {
    OneHour,
    ThirtyMinutes,
    FifteenMinutes,
    Starting,
}

impl GroupReminder {
    /// The stage whose window contains `minutes_until`, if any.
    pub fn for_minutes(minutes_until: i64) -> Option<Self> {
        match minutes_until {
            59..=61 => Some(Self::OneHour),
            29..=31 => Some(Self::ThirtyMinutes),
            14..=16 => Some(Self::FifteenMinutes),
            1..=3 => Some(Self::Starting),
            _ => None,
        }
    }

    pub fn audience(self) -> Audience {
        match self {
            Self::OneHour | Self::FifteenMinutes => Audience::Channel,
            Self::ThirtyMinutes | Self::Starting => Audience::Everyone,
        }
    }

    pub fn text(self, title: &str) -> String {
        match self {
            Self::OneHour => format!("1 hour until {title}."),
            Self::ThirtyMinutes => format!("{title} starts in 30 minutes!"),
            Self::FifteenMinutes => format!("15 minutes until {title}. Prep up."),
            Self::Starting => format!("{title} starts NOW!"),
        }
    }
}

/// Whole minutes from `now` until the event starts, truncated toward zero.
pub fn minutes_until(event: &Event, now: DateTime<Utc>) -> i64 {
    (event.starts_at - now).num_minutes()
}

/// Counts from one [`ReminderScheduler::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub events_checked: usize,
    pub group_sent: usize,
    pub personal_sent: usize,
    pub failed: usize,
}

pub struct ReminderScheduler<S, N> {
    store: S,
    notifier: N,
    interval: Duration,
    /// Group stages already announced, keyed by event and start time so
    /// overlapping ticks send each once and a rescheduled event starts over.
    announced: HashSet<(u64, DateTime<Utc>, GroupReminder)>,
}

impl<S: EventStore, N: Notifier> ReminderScheduler<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            interval: DEFAULT_INTERVAL,
            announced: HashSet::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (S, N) {
        (self.store, self.notifier)
    }

    /// Check every event against `now` and send whatever is due.
    ///
    /// Group reminders go out once per event and stage. A personal reminder
    /// is cleared from the store after it is delivered; if delivery fails it
    /// stays pending and is retried on the next tick. Notifier failures are
    /// counted in the report, store failures abort the tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let mut report = TickReport::default();
        tracing::debug!(now = %now, "reminder tick");

        for event in self.store.events()? {
            report.events_checked += 1;
            let minutes = minutes_until(&event, now);
            tracing::trace!(event = event.id, title = %event.title, minutes, "checking event");

            if let Some(stage) = GroupReminder::for_minutes(minutes) {
                let key = (event.id, event.starts_at, stage);
                if !self.announced.contains(&key) {
                    let notification = Notification {
                        event_id: event.id,
                        audience: stage.audience(),
                        text: stage.text(&event.title),
                    };
                    if self.deliver(&notification) {
                        self.announced.insert(key);
                        report.group_sent += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }

            for rsvp in self.store.reminders_due(event.id)? {
                let Some(offset) = rsvp.reminder_minutes else {
                    continue;
                };
                if (i64::from(offset) - minutes).abs() > PERSONAL_TOLERANCE_MINUTES {
                    continue;
                }
                let notification = Notification {
                    event_id: event.id,
                    audience: Audience::Player {
                        name: rsvp.player_name.clone(),
                        contact: rsvp.contact.clone(),
                    },
                    text: format!(
                        "{} starts in {:.1} hours!",
                        event.title,
                        f64::from(offset) / 60.0
                    ),
                };
                if self.deliver(&notification) {
                    self.store.clear_reminder(event.id, &rsvp.player_name)?;
                    tracing::info!(
                        player = %rsvp.player_name,
                        event = event.id,
                        title = %event.title,
                        "personal reminder sent"
                    );
                    report.personal_sent += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Tick at the configured interval until `stop` is set.
    ///
    /// Each iteration also purges expired events. A failing iteration is
    /// logged and the loop carries on.
    pub fn run(&mut self, clock: &dyn Clock, stop: &AtomicBool) {
        tracing::info!(interval_secs = self.interval.as_secs(), "reminder scheduler started");
        while !stop.load(Ordering::Relaxed) {
            let now = clock.now();
            match self.tick(now) {
                Ok(report) => tracing::debug!(?report, "reminder tick finished"),
                Err(e) => tracing::error!(error = %e, "reminder tick failed"),
            }
            if let Err(e) = self.purge_expired(now) {
                tracing::error!(error = %e, "cleanup failed");
            }
            self.sleep_interval(stop);
        }
        tracing::info!("reminder scheduler stopped");
    }

    /// Delete past events and their RSVPs, and forget their announcements.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let deleted = purge_expired(&mut self.store, now)?;
        if deleted > 0 {
            let live: HashSet<u64> = self.store.events()?.iter().map(|e| e.id).collect();
            self.announced.retain(|(id, _, _)| live.contains(id));
        }
        Ok(deleted)
    }

    fn deliver(&mut self, notification: &Notification) -> bool {
        match self.notifier.send(notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(event = notification.event_id, error = %e, "notification failed");
                false
            }
        }
    }

    fn sleep_interval(&self, stop: &AtomicBool) {
        let mut remaining = self.interval;
        while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
            let step = remaining.min(STOP_POLL);
            std::thread::sleep(step);
            remaining -= step;
        }
    }
}

/// Delete events that started before `now` and their RSVPs.
pub fn purge_expired<S: EventStore + ?Sized>(store: &mut S, now: DateTime<Utc>) -> Result<usize> {
    let deleted = store.delete_expired(now)?;
    if deleted > 0 {
        tracing::info!(deleted, "cleaned expired events and orphaned RSVPs");
    }
    Ok(deleted)
}
