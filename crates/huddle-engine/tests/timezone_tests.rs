//! Tests for timezone normalization and the alias table.

use chrono_tz::Tz;
use huddle_engine::timezone::{resolve_alias, TIMEZONE_ALIASES};
use huddle_engine::{normalize_timezone, CanonicalTimezone, HuddleError};

// ── Alias table ─────────────────────────────────────────────────────────────

#[test]
fn every_alias_normalizes_to_a_valid_identifier() {
    for (alias, canonical) in TIMEZONE_ALIASES {
        let tz = normalize_timezone(alias).unwrap_or_else(|e| panic!("{alias}: {e}"));
        assert_eq!(tz.name(), *canonical, "alias {alias}");
        // The result must resolve on its own, without the alias table.
        assert!(tz.name().parse::<Tz>().is_ok(), "{} does not validate", tz.name());
    }
}

#[test]
fn alias_keys_are_lowercase_and_unique() {
    let mut seen = std::collections::HashSet::new();
    for (alias, _) in TIMEZONE_ALIASES {
        assert_eq!(*alias, alias.to_lowercase());
        assert!(seen.insert(*alias), "duplicate alias {alias}");
    }
}

#[test]
fn resolve_alias_ignores_case_and_whitespace() {
    assert_eq!(resolve_alias(" Pacific "), Some("America/Los_Angeles"));
    assert_eq!(resolve_alias("AEDT"), Some("Australia/Sydney"));
    assert_eq!(resolve_alias("Europe/Paris"), None);
}

// ── Normalization ───────────────────────────────────────────────────────────

#[test]
fn trim_and_case_insensitive() {
    assert_eq!(
        normalize_timezone("  CST ").unwrap(),
        normalize_timezone("cst").unwrap()
    );
    assert_eq!(normalize_timezone("cst").unwrap().name(), "America/Chicago");
}

#[test]
fn canonical_identifier_passes_through() {
    let tz = normalize_timezone("America/New_York").unwrap();
    assert_eq!(tz.name(), "America/New_York");
    assert_eq!(tz.tz(), Tz::America__New_York);
}

#[test]
fn lowercase_identifier_is_repaired() {
    assert_eq!(normalize_timezone("europe/paris").unwrap().name(), "Europe/Paris");
    assert_eq!(
        normalize_timezone("america/new_york").unwrap().name(),
        "America/New_York"
    );
}

#[test]
fn spaces_in_city_become_underscores() {
    assert_eq!(
        normalize_timezone("AMERICA/NEW YORK").unwrap().name(),
        "America/New_York"
    );
}

#[test]
fn nested_city_segments_are_repaired() {
    assert_eq!(
        normalize_timezone("america/argentina/buenos_aires").unwrap().name(),
        "America/Argentina/Buenos_Aires"
    );
}

#[test]
fn unknown_timezone_is_rejected_without_fallback() {
    let err = normalize_timezone("Moon/Base").unwrap_err();
    assert!(matches!(err, HuddleError::InvalidTimezone(ref raw) if raw == "Moon/Base"));
}

#[test]
fn unknown_abbreviation_is_rejected() {
    assert!(matches!(
        normalize_timezone("xyz"),
        Err(HuddleError::InvalidTimezone(_))
    ));
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(
        normalize_timezone("   "),
        Err(HuddleError::InvalidTimezone(_))
    ));
}

// ── CanonicalTimezone ───────────────────────────────────────────────────────

#[test]
fn display_and_from_str() {
    let tz: CanonicalTimezone = "jst".parse().unwrap();
    assert_eq!(tz.to_string(), "Asia/Tokyo");
}

#[test]
fn serde_uses_identifier_string() {
    let tz: CanonicalTimezone = serde_json::from_str("\"pst\"").unwrap();
    assert_eq!(serde_json::to_string(&tz).unwrap(), "\"America/Los_Angeles\"");
    assert!(serde_json::from_str::<CanonicalTimezone>("\"nowhere\"").is_err());
}
