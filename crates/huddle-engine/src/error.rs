//! Error types for huddle-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuddleError {
    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid time format: '{0}'")]
    InvalidTimeFormat(String),

    #[error("Time out of range: hour must be 0-23 and minute 0-59 (got {hour}:{minute:02})")]
    InvalidTimeRange { hour: u32, minute: u32 },

    #[error("{time} does not exist in {timezone} (DST gap)")]
    NonexistentLocalTime { timezone: String, time: String },

    /// Local↔UTC conversion failed; `source` holds the specific cause.
    #[error("Failed to convert {direction}: {source}")]
    ConversionFailure {
        direction: &'static str,
        #[source]
        source: Box<HuddleError>,
    },

    #[error("Invalid event time: '{0}' (expected YYYY-MM-DD HH:MM in UTC)")]
    InvalidEventTime(String),

    #[error("Event time {0} is in the past")]
    EventInPast(String),

    #[error("Invalid reminder: '{0}' (expected hours between 1 and 168)")]
    InvalidReminder(String),

    #[error("Event {0} not found")]
    EventNotFound(u64),

    #[error("Player '{0}' not found")]
    PlayerNotFound(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be read back into a record.
    #[error("Corrupt store row: {0}")]
    CorruptRow(String),
}

impl HuddleError {
    /// Wrap `self` as a conversion failure in the given direction.
    pub(crate) fn during(self, direction: &'static str) -> Self {
        HuddleError::ConversionFailure {
            direction,
            source: Box::new(self),
        }
    }

    /// The underlying error with every `ConversionFailure` layer removed.
    pub fn root(&self) -> &HuddleError {
        match self {
            HuddleError::ConversionFailure { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for errors caused by bad user input rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self.root(),
            HuddleError::Io(_) | HuddleError::Sqlite(_) | HuddleError::CorruptRow(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HuddleError>;
