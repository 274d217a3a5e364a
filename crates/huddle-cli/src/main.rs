//! `huddle` CLI — availability, best meeting times, events, RSVPs and
//! reminders from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Check how a timezone or time of day will be understood
//! huddle tz "central"
//! huddle time "4:30pm"
//!
//! # Convert between a player's local time and UTC
//! huddle to-utc 5pm --tz cst
//! huddle to-local "2026-05-21 23:00" --tz aedt
//!
//! # Save availability and ask for the best meeting windows
//! huddle player set ShadowKing23 --tz eastern --start 7pm --end 11pm
//! huddle best-times
//!
//! # Events, RSVPs and reminders
//! huddle event create --title "Bear Hunt" --at "2026-05-21 23:00"
//! huddle rsvp 1 ShadowKing23 --reminder 2
//! huddle remind
//! ```

mod config;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use huddle_engine::event::EVENT_TIME_FORMAT;
use huddle_engine::reminder::{purge_expired, Audience};
use huddle_engine::render::{render_best_times, render_event, user_message};
use huddle_engine::timezone::TIMEZONE_ALIASES;
use huddle_engine::{
    local_to_utc, normalize_timezone, parse_event_time, parse_reminder_hours, parse_time_string,
    suggest_meeting_times, utc_to_local, AvailabilityStore, Clock, EventStore, HuddleError,
    NewEvent, Notification, Notifier, PlayerAvailability, ReminderScheduler, Rsvp, RsvpResponse,
    SqliteStore, SystemClock,
};

use crate::config::{load_config, Config};

#[derive(Parser)]
#[command(
    name = "huddle",
    version,
    about = "Group scheduling: availability, best meeting times, events and reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./huddle.toml when present)
    #[arg(long, global = true, env = "HUDDLE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite store file (overrides the config file)
    #[arg(long, global = true, env = "HUDDLE_STORE")]
    store: Option<PathBuf>,

    /// Log filter, e.g. "info" or "huddle_engine=debug" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical timezone for a name or alias
    Tz {
        /// Timezone as a user would type it (e.g. "cst", "Europe/Paris")
        raw: String,
    },
    /// Show how a time of day is parsed
    Time {
        /// Time as a user would type it (e.g. "4pm", "0430", "16:00")
        raw: String,
    },
    /// Convert a local time of day to UTC (today's date in that zone)
    ToUtc {
        time: String,
        #[arg(long)]
        tz: String,
    },
    /// Convert a UTC instant to local HH:MM
    ToLocal {
        /// "YYYY-MM-DD HH:MM" (UTC) or RFC 3339
        instant: String,
        #[arg(long)]
        tz: String,
    },
    /// List the supported timezone aliases
    Aliases,
    /// Manage player availability
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },
    /// Rank the best two-hour UTC windows by player availability
    BestTimes {
        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },
    /// RSVP a player to an event
    Rsvp {
        event_id: u64,
        player: String,
        /// Personal reminder, in hours before the event (1-168)
        #[arg(long)]
        reminder: Option<String>,
        /// Chat handle used to mention the player
        #[arg(long)]
        contact: Option<String>,
        /// Record a "no" instead of a "yes"
        #[arg(long)]
        decline: bool,
    },
    /// Send due reminders; loops at the configured interval unless --once
    Remind {
        #[arg(long)]
        once: bool,
    },
    /// Delete events that have already started
    Cleanup,
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Save (or replace) a player's daily availability window
    Set {
        name: String,
        #[arg(long)]
        tz: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Delete a player's availability
    Remove { name: String },
    /// List saved availability
    List,
}

#[derive(Subcommand)]
enum EventAction {
    /// Create an event
    Create {
        #[arg(long)]
        title: String,
        /// Start time in UTC, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "admin")]
        creator: String,
    },
    /// Change an event's time or description
    Edit {
        id: u64,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event and its RSVPs
    Delete { id: u64 },
    /// List upcoming events
    List,
    /// Show one event as a player sees it
    Show {
        id: u64,
        /// Player whose timezone and RSVP to show
        #[arg(long)]
        viewer: Option<String>,
    },
}

/// Prints notifications to stdout in place of a chat channel.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&mut self, notification: &Notification) -> huddle_engine::error::Result<()> {
        let mention = match &notification.audience {
            Audience::Channel => String::new(),
            Audience::Everyone => "@everyone ".to_string(),
            Audience::Player { contact: Some(c), .. } => format!("<@{c}> "),
            Audience::Player { name, .. } => format!("{name} "),
        };
        println!("[event {}] {}{}", notification.event_id, mention, notification.text);
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        if let Some(huddle) = err.downcast_ref::<HuddleError>() {
            if huddle.is_validation() {
                eprintln!("{}", user_message(huddle));
                process::exit(2);
            }
        }
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref(), &config);

    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path());
    let open_store = || {
        SqliteStore::open(&store_path)
            .with_context(|| format!("Failed to open store: {}", store_path.display()))
    };
    let clock = SystemClock;

    match cli.command {
        Commands::Tz { raw } => {
            let tz = normalize_timezone(&raw)?;
            println!("{tz}");
        }
        Commands::Time { raw } => {
            let time = parse_time_string(&raw)?;
            println!("{time}");
        }
        Commands::ToUtc { time, tz } => {
            let utc = local_to_utc(&time, &tz, &clock)?;
            println!("{}", utc.format(EVENT_TIME_FORMAT));
        }
        Commands::ToLocal { instant, tz } => {
            let instant = parse_instant(&instant)?;
            println!("{}", utc_to_local(instant, &tz)?);
        }
        Commands::Aliases => {
            for (alias, canonical) in TIMEZONE_ALIASES {
                println!("{alias:<16} {canonical}");
            }
        }
        Commands::Player { action } => player_command(action, open_store()?)?,
        Commands::BestTimes { json } => {
            let store = open_store()?;
            let ranked = suggest_meeting_times(&store.fetch_all()?, &clock);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!("{}", render_best_times(&ranked));
            }
        }
        Commands::Event { action } => event_command(action, open_store()?, &clock)?,
        Commands::Rsvp {
            event_id,
            player,
            reminder,
            contact,
            decline,
        } => {
            let mut store = open_store()?;
            let (response, reminder_minutes) = if decline {
                (RsvpResponse::No, None)
            } else {
                (
                    RsvpResponse::Yes,
                    parse_reminder_hours(reminder.as_deref().unwrap_or(""))?,
                )
            };
            store.set_rsvp(Rsvp {
                event_id,
                player_name: player.clone(),
                contact,
                response,
                reminder_minutes,
            })?;
            tracing::info!(event = event_id, player = %player, ?reminder_minutes, "rsvp saved");
            match (response, reminder_minutes) {
                (RsvpResponse::No, _) => println!("RSVP saved: {player} is not attending."),
                (_, Some(minutes)) => println!(
                    "RSVP saved! Reminder {:.1} hours before.",
                    f64::from(minutes) / 60.0
                ),
                (_, None) => println!("RSVP saved, no reminder set."),
            }
        }
        Commands::Remind { once } => {
            let mut scheduler = ReminderScheduler::new(open_store()?, StdoutNotifier)
                .with_interval(config.reminder_interval());
            if once {
                let now = clock.now();
                let report = scheduler.tick(now)?;
                scheduler.purge_expired(now)?;
                println!(
                    "Checked {} events: {} group, {} personal, {} failed",
                    report.events_checked, report.group_sent, report.personal_sent, report.failed
                );
            } else {
                let stop = AtomicBool::new(false);
                scheduler.run(&clock, &stop);
            }
        }
        Commands::Cleanup => {
            let mut store = open_store()?;
            let deleted = purge_expired(&mut store, clock.now())?;
            println!("Deleted {deleted} expired events.");
        }
    }

    Ok(())
}

fn player_command(action: PlayerAction, mut store: SqliteStore) -> Result<()> {
    match action {
        PlayerAction::Set {
            name,
            tz,
            start,
            end,
        } => {
            let record = PlayerAvailability::from_input(&name, &tz, &start, &end)?;
            let summary = format!(
                "Saved {}: {}-{} {}",
                record.player_name, record.start, record.end, record.timezone
            );
            store.upsert(record)?;
            println!("{summary}");
        }
        PlayerAction::Remove { name } => {
            if !store.remove(&name)? {
                return Err(HuddleError::PlayerNotFound(name).into());
            }
            println!("Deleted player {name}.");
        }
        PlayerAction::List => {
            for record in store.fetch_all()? {
                println!(
                    "{:<20} {}-{} {}",
                    record.player_name, record.start, record.end, record.timezone
                );
            }
        }
    }
    Ok(())
}

fn event_command(action: EventAction, mut store: SqliteStore, clock: &dyn Clock) -> Result<()> {
    match action {
        EventAction::Create {
            title,
            at,
            description,
            creator,
        } => {
            let starts_at = parse_event_time(&at, clock.now())?;
            let event = store.create_event(NewEvent {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                starts_at,
                creator,
            })?;
            tracing::info!(event = event.id, title = %event.title, "event created");
            println!("Created event {}: {}", event.id, event.title);
        }
        EventAction::Edit {
            id,
            at,
            description,
        } => {
            let current = store.event(id)?.ok_or(HuddleError::EventNotFound(id))?;
            let starts_at = match at {
                Some(raw) => parse_event_time(&raw, clock.now())?,
                None => current.starts_at,
            };
            let updated = store.update_event(
                id,
                NewEvent {
                    title: current.title.clone(),
                    description: description.unwrap_or(current.description),
                    starts_at,
                    creator: current.creator,
                },
            )?;
            println!("Event updated.");
            if updated.starts_at != current.starts_at {
                let mentions: Vec<String> = store
                    .rsvps(id)?
                    .into_iter()
                    .filter(|r| r.response == RsvpResponse::Yes)
                    .map(|r| match r.contact {
                        Some(c) => format!("<@{c}>"),
                        None => r.player_name,
                    })
                    .collect();
                println!(
                    "Event Updated: {}\nNew Time: {} UTC\n{}",
                    updated.title,
                    updated.starts_at.format(EVENT_TIME_FORMAT),
                    mentions.join(", ")
                );
            }
        }
        EventAction::Delete { id } => {
            if !store.delete_event(id)? {
                return Err(HuddleError::EventNotFound(id).into());
            }
            println!("Deleted event {id}.");
        }
        EventAction::List => {
            for event in store.events()? {
                println!(
                    "{:>4}  {}  {}  ({} RSVPs)",
                    event.id,
                    event.starts_at.format(EVENT_TIME_FORMAT),
                    event.title,
                    store.count_yes(event.id)?
                );
            }
        }
        EventAction::Show { id, viewer } => {
            let event = store.event(id)?.ok_or(HuddleError::EventNotFound(id))?;
            let (viewer_tz, viewer_rsvp) = match viewer.as_deref() {
                Some(name) => (
                    store
                        .fetch_all()?
                        .into_iter()
                        .find(|p| p.player_name == name)
                        .map(|p| p.timezone),
                    store.rsvp(id, name)?,
                ),
                None => (None, None),
            };
            println!(
                "{}",
                render_event(
                    &event,
                    viewer_tz.as_deref(),
                    store.count_yes(id)?,
                    viewer_rsvp.as_ref()
                )
            );
        }
    }
    Ok(())
}

/// Parse `YYYY-MM-DD HH:MM` as UTC, or any RFC 3339 timestamp.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid instant: '{raw}' (expected YYYY-MM-DD HH:MM or RFC 3339)"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn init_logging(flag: Option<&str>, config: &Config) {
    let filter = match flag {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
