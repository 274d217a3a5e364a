//! Persistence for availability records, events and RSVPs.
//!
//! The engine only depends on the [`AvailabilityStore`] and [`EventStore`]
//! traits. [`MemoryStore`] keeps everything in maps for tests and embedding;
//! [`SqliteStore`] is the persistent store shared by every `huddle` process.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::clock::{parse_time_string, ClockTime};
use crate::error::{HuddleError, Result};
use crate::event::{Event, NewEvent, Rsvp, RsvpResponse};
use crate::player::PlayerAvailability;

pub trait AvailabilityStore {
    /// All records, ordered by player name.
    fn fetch_all(&self) -> Result<Vec<PlayerAvailability>>;

    /// Insert or fully replace the record for `record.player_name`.
    fn upsert(&mut self, record: PlayerAvailability) -> Result<()>;

    /// Delete a player's record. Returns whether one existed.
    fn remove(&mut self, player_name: &str) -> Result<bool>;
}

pub trait EventStore {
    /// All events, soonest first.
    fn events(&self) -> Result<Vec<Event>>;

    fn event(&self, id: u64) -> Result<Option<Event>>;

    fn create_event(&mut self, new: NewEvent) -> Result<Event>;

    /// Replace an event's fields, keeping its id and RSVPs.
    fn update_event(&mut self, id: u64, new: NewEvent) -> Result<Event>;

    /// Delete an event and its RSVPs. Returns whether it existed.
    fn delete_event(&mut self, id: u64) -> Result<bool>;

    /// Insert or replace the RSVP for `(rsvp.event_id, rsvp.player_name)`.
    fn set_rsvp(&mut self, rsvp: Rsvp) -> Result<()>;

    fn rsvps(&self, event_id: u64) -> Result<Vec<Rsvp>>;

    /// Drop a pending personal reminder once it has been delivered.
    fn clear_reminder(&mut self, event_id: u64, player_name: &str) -> Result<()>;

    /// Delete events that started before `now` together with any RSVPs left
    /// without an event. Returns the number of events deleted.
    fn delete_expired(&mut self, now: DateTime<Utc>) -> Result<usize>;

    fn rsvp(&self, event_id: u64, player_name: &str) -> Result<Option<Rsvp>> {
        Ok(self
            .rsvps(event_id)?
            .into_iter()
            .find(|r| r.player_name == player_name))
    }

    fn count_yes(&self, event_id: u64) -> Result<usize> {
        Ok(self
            .rsvps(event_id)?
            .iter()
            .filter(|r| r.response == RsvpResponse::Yes)
            .count())
    }

    /// RSVPs that answered yes and still have a personal reminder pending.
    fn reminders_due(&self, event_id: u64) -> Result<Vec<Rsvp>> {
        Ok(self
            .rsvps(event_id)?
            .into_iter()
            .filter(Rsvp::wants_reminder)
            .collect())
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    players: BTreeMap<String, PlayerAvailability>,
    events: BTreeMap<u64, Event>,
    rsvps: Vec<Rsvp>,
    next_event_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AvailabilityStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<PlayerAvailability>> {
        Ok(self.players.values().cloned().collect())
    }

    fn upsert(&mut self, record: PlayerAvailability) -> Result<()> {
        self.players.insert(record.player_name.clone(), record);
        Ok(())
    }

    fn remove(&mut self, player_name: &str) -> Result<bool> {
        Ok(self.players.remove(player_name).is_some())
    }
}

impl EventStore for MemoryStore {
    fn events(&self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self.events.values().cloned().collect();
        events.sort_by_key(|e| (e.starts_at, e.id));
        Ok(events)
    }

    fn event(&self, id: u64) -> Result<Option<Event>> {
        Ok(self.events.get(&id).cloned())
    }

    fn create_event(&mut self, new: NewEvent) -> Result<Event> {
        self.next_event_id += 1;
        let event = Event {
            id: self.next_event_id,
            title: new.title,
            description: new.description,
            starts_at: new.starts_at,
            creator: new.creator,
        };
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn update_event(&mut self, id: u64, new: NewEvent) -> Result<Event> {
        let event = self
            .events
            .get_mut(&id)
            .ok_or(HuddleError::EventNotFound(id))?;
        event.title = new.title;
        event.description = new.description;
        event.starts_at = new.starts_at;
        event.creator = new.creator;
        Ok(event.clone())
    }

    fn delete_event(&mut self, id: u64) -> Result<bool> {
        let existed = self.events.remove(&id).is_some();
        self.rsvps.retain(|r| r.event_id != id);
        Ok(existed)
    }

    fn set_rsvp(&mut self, rsvp: Rsvp) -> Result<()> {
        if !self.events.contains_key(&rsvp.event_id) {
            return Err(HuddleError::EventNotFound(rsvp.event_id));
        }
        match self
            .rsvps
            .iter_mut()
            .find(|r| r.event_id == rsvp.event_id && r.player_name == rsvp.player_name)
        {
            Some(existing) => *existing = rsvp,
            None => self.rsvps.push(rsvp),
        }
        Ok(())
    }

    fn rsvps(&self, event_id: u64) -> Result<Vec<Rsvp>> {
        Ok(self
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    fn clear_reminder(&mut self, event_id: u64, player_name: &str) -> Result<()> {
        for rsvp in self
            .rsvps
            .iter_mut()
            .filter(|r| r.event_id == event_id && r.player_name == player_name)
        {
            rsvp.reminder_minutes = None;
        }
        Ok(())
    }

    fn delete_expired(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let before = self.events.len();
        self.events.retain(|_, e| e.starts_at >= now);
        let events = &self.events;
        self.rsvps.retain(|r| events.contains_key(&r.event_id));
        Ok(before - self.events.len())
    }
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS players (
    player_name TEXT PRIMARY KEY,
    timezone TEXT NOT NULL,
    availability_start TEXT NOT NULL,
    availability_end TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    starts_at INTEGER NOT NULL,
    creator TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rsvps (
    event_id INTEGER NOT NULL,
    player_name TEXT NOT NULL,
    contact TEXT,
    response TEXT NOT NULL CHECK (response IN ('yes', 'no')),
    reminder_minutes INTEGER,
    PRIMARY KEY (event_id, player_name),
    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at);
";

/// How long a write waits for another connection to release the database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store.
///
/// Several processes (a long-running reminder loop and one-off commands) may
/// open the same file. Each mutation is a single statement or an immediate
/// transaction, so concurrent writers serialize inside SQLite instead of
/// overwriting each other.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`, creating parent directories.
    /// Fails early if the file exists but is not a database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl AvailabilityStore for SqliteStore {
    fn fetch_all(&self) -> Result<Vec<PlayerAvailability>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT player_name, timezone, availability_start, availability_end
             FROM players ORDER BY player_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (player_name, timezone, start, end) = row?;
            records.push(PlayerAvailability {
                start: stored_time(&start)?,
                end: stored_time(&end)?,
                player_name,
                timezone,
            });
        }
        Ok(records)
    }

    fn upsert(&mut self, record: PlayerAvailability) -> Result<()> {
        self.conn.execute(
            "INSERT INTO players (player_name, timezone, availability_start, availability_end)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(player_name) DO UPDATE SET
               timezone = excluded.timezone,
               availability_start = excluded.availability_start,
               availability_end = excluded.availability_end",
            params![
                record.player_name,
                record.timezone,
                record.start.to_string(),
                record.end.to_string()
            ],
        )?;
        Ok(())
    }

    fn remove(&mut self, player_name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM players WHERE player_name = ?1", params![player_name])?;
        Ok(deleted > 0)
    }
}

impl EventStore for SqliteStore {
    fn events(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, title, description, starts_at, creator
             FROM events ORDER BY starts_at, id",
        )?;
        let events = stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn event(&self, id: u64) -> Result<Option<Event>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, title, description, starts_at, creator FROM events WHERE id = ?1",
                params![id as i64],
                event_from_row,
            )
            .optional()?)
    }

    fn create_event(&mut self, new: NewEvent) -> Result<Event> {
        self.conn.execute(
            "INSERT INTO events (title, description, starts_at, creator) VALUES (?1, ?2, ?3, ?4)",
            params![new.title, new.description, new.starts_at.timestamp(), new.creator],
        )?;
        Ok(Event {
            id: self.conn.last_insert_rowid() as u64,
            title: new.title,
            description: new.description,
            starts_at: new.starts_at,
            creator: new.creator,
        })
    }

    fn update_event(&mut self, id: u64, new: NewEvent) -> Result<Event> {
        let updated = self.conn.execute(
            "UPDATE events SET title = ?1, description = ?2, starts_at = ?3, creator = ?4
             WHERE id = ?5",
            params![
                new.title,
                new.description,
                new.starts_at.timestamp(),
                new.creator,
                id as i64
            ],
        )?;
        if updated == 0 {
            return Err(HuddleError::EventNotFound(id));
        }
        Ok(Event {
            id,
            title: new.title,
            description: new.description,
            starts_at: new.starts_at,
            creator: new.creator,
        })
    }

    fn delete_event(&mut self, id: u64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1", params![id as i64])?;
        Ok(deleted > 0)
    }

    fn set_rsvp(&mut self, rsvp: Rsvp) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM events WHERE id = ?1",
                params![rsvp.event_id as i64],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(HuddleError::EventNotFound(rsvp.event_id));
        }
        tx.execute(
            "INSERT INTO rsvps (event_id, player_name, contact, response, reminder_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(event_id, player_name) DO UPDATE SET
               contact = excluded.contact,
               response = excluded.response,
               reminder_minutes = excluded.reminder_minutes",
            params![
                rsvp.event_id as i64,
                rsvp.player_name,
                rsvp.contact,
                response_name(rsvp.response),
                rsvp.reminder_minutes
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn rsvps(&self, event_id: u64) -> Result<Vec<Rsvp>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT player_name, contact, response, reminder_minutes
             FROM rsvps WHERE event_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![event_id as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<u32>>(3)?,
            ))
        })?;

        let mut rsvps = Vec::new();
        for row in rows {
            let (player_name, contact, response, reminder_minutes) = row?;
            rsvps.push(Rsvp {
                event_id,
                player_name,
                contact,
                response: stored_response(&response)?,
                reminder_minutes,
            });
        }
        Ok(rsvps)
    }

    fn clear_reminder(&mut self, event_id: u64, player_name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE rsvps SET reminder_minutes = NULL WHERE event_id = ?1 AND player_name = ?2",
            params![event_id as i64, player_name],
        )?;
        Ok(())
    }

    fn delete_expired(&mut self, now: DateTime<Utc>) -> Result<usize> {
        // Stored times are whole seconds; round `now` up so an event starting
        // within the current second counts as started.
        let cutoff = now.timestamp() + i64::from(now.timestamp_subsec_nanos() > 0);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute("DELETE FROM events WHERE starts_at < ?1", params![cutoff])?;
        tx.execute(
            "DELETE FROM rsvps WHERE event_id NOT IN (SELECT id FROM events)",
            [],
        )?;
        tx.commit()?;
        Ok(deleted)
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let starts_at: i64 = row.get(3)?;
    Ok(Event {
        id: row.get::<_, i64>(0)? as u64,
        title: row.get(1)?,
        description: row.get(2)?,
        starts_at: DateTime::from_timestamp(starts_at, 0)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, starts_at))?,
        creator: row.get(4)?,
    })
}

fn stored_time(raw: &str) -> Result<ClockTime> {
    parse_time_string(raw).map_err(|_| HuddleError::CorruptRow(format!("clock time '{raw}'")))
}

fn response_name(response: RsvpResponse) -> &'static str {
    match response {
        RsvpResponse::Yes => "yes",
        RsvpResponse::No => "no",
    }
}

fn stored_response(raw: &str) -> Result<RsvpResponse> {
    match raw {
        "yes" => Ok(RsvpResponse::Yes),
        "no" => Ok(RsvpResponse::No),
        other => Err(HuddleError::CorruptRow(format!("rsvp response '{other}'"))),
    }
}
