//! Timezone normalization -- freeform user input to canonical IANA identifiers.
//!
//! Users type things like `"cst"`, `"Pacific"`, `" America/New_York "` or
//! `"europe/paris"`. [`normalize_timezone`] resolves all of these through a
//! fixed alias table and the `chrono-tz` database. Invalid input is rejected;
//! there is no fallback timezone.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HuddleError, Result};

/// Informal timezone names mapped to canonical identifiers.
///
/// Keys are lowercase. Abbreviations that are ambiguous worldwide resolve to
/// the single region listed here (`cst` is US Central, not China).
pub const TIMEZONE_ALIASES: &[(&str, &str)] = &[
    // US
    ("utc", "UTC"),
    ("est", "America/New_York"),
    ("edt", "America/New_York"),
    ("eastern", "America/New_York"),
    ("et", "America/New_York"),
    ("cst", "America/Chicago"),
    ("cdt", "America/Chicago"),
    ("central", "America/Chicago"),
    ("ct", "America/Chicago"),
    ("mst", "America/Denver"),
    ("mdt", "America/Denver"),
    ("mountain", "America/Denver"),
    ("mt", "America/Denver"),
    ("pst", "America/Los_Angeles"),
    ("pdt", "America/Los_Angeles"),
    ("pacific", "America/Los_Angeles"),
    ("pt", "America/Los_Angeles"),
    // Canada
    ("canada/pacific", "America/Vancouver"),
    ("canada/eastern", "America/Toronto"),
    ("canada/atlantic", "America/Halifax"),
    // UK / Europe
    ("bst", "Europe/London"),
    ("gmt", "Europe/London"),
    ("uk", "Europe/London"),
    ("west", "Europe/Lisbon"),
    ("cet", "Europe/Paris"),
    ("cest", "Europe/Paris"),
    ("eet", "Europe/Bucharest"),
    ("eest", "Europe/Bucharest"),
    // Australia / NZ
    ("aest", "Australia/Sydney"),
    ("aedt", "Australia/Sydney"),
    ("aus", "Australia/Sydney"),
    ("australia", "Australia/Sydney"),
    ("acst", "Australia/Adelaide"),
    ("acdt", "Australia/Adelaide"),
    ("awst", "Australia/Perth"),
    ("nzst", "Pacific/Auckland"),
    ("nzdt", "Pacific/Auckland"),
    ("nz", "Pacific/Auckland"),
    // Asia
    ("ist", "Asia/Kolkata"),
    ("india", "Asia/Kolkata"),
    ("china", "Asia/Shanghai"),
    ("cst-asia", "Asia/Shanghai"),
    ("kst", "Asia/Seoul"),
    ("kr", "Asia/Seoul"),
    ("jst", "Asia/Tokyo"),
    ("jp", "Asia/Tokyo"),
    ("sgt", "Asia/Singapore"),
    ("hkt", "Asia/Hong_Kong"),
    ("thai", "Asia/Bangkok"),
    // Middle East
    ("gst", "Asia/Dubai"),
    ("iran", "Asia/Tehran"),
    ("israel", "Asia/Jerusalem"),
    // South America
    ("brt", "America/Sao_Paulo"),
    ("arg", "America/Argentina/Buenos_Aires"),
    // Africa
    ("sast", "Africa/Johannesburg"),
    ("egypt", "Africa/Cairo"),
];

/// A timezone identifier that resolves in the timezone database.
///
/// Only obtainable through [`normalize_timezone`] (or its `FromStr` /
/// `Deserialize` wrappers), so holding one means validation already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalTimezone(Tz);

impl CanonicalTimezone {
    /// The canonical identifier, e.g. `"America/Chicago"`.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// The `chrono-tz` zone carrying the offset and DST rules.
    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl fmt::Display for CanonicalTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalTimezone {
    type Err = HuddleError;

    fn from_str(s: &str) -> Result<Self> {
        normalize_timezone(s)
    }
}

impl Serialize for CanonicalTimezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CanonicalTimezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        normalize_timezone(&raw).map_err(serde::de::Error::custom)
    }
}

/// Look up an informal name in [`TIMEZONE_ALIASES`] (case- and
/// whitespace-insensitive).
pub fn resolve_alias(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    TIMEZONE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Resolve a user-typed timezone into a [`CanonicalTimezone`].
///
/// The input is trimmed and lowercased, then looked up in the alias table.
/// Anything not in the table is tried directly as an identifier. If that
/// fails and the input looks like `region/city`, the casing is repaired
/// (`"america/new york"` becomes `"America/New_York"`) and validation is
/// retried once.
///
/// # Errors
/// Returns `HuddleError::InvalidTimezone` when no candidate validates.
///
/// # Examples
///
/// ```
/// use huddle_engine::normalize_timezone;
///
/// assert_eq!(normalize_timezone("  CST ").unwrap().name(), "America/Chicago");
/// assert_eq!(normalize_timezone("europe/paris").unwrap().name(), "Europe/Paris");
/// assert!(normalize_timezone("moon/base").is_err());
/// ```
pub fn normalize_timezone(raw: &str) -> Result<CanonicalTimezone> {
    let key = raw.trim().to_lowercase();
    let candidate = resolve_alias(&key).unwrap_or(key.as_str());

    if let Ok(tz) = candidate.parse::<Tz>() {
        return Ok(CanonicalTimezone(tz));
    }

    if let Some((region, city)) = key.split_once('/') {
        let repaired = format!("{}/{}", title_case(region), title_case(city).replace(' ', "_"));
        if let Ok(tz) = repaired.parse::<Tz>() {
            return Ok(CanonicalTimezone(tz));
        }
    }

    Err(HuddleError::InvalidTimezone(raw.to_string()))
}

/// Uppercase every letter that follows a non-letter, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
