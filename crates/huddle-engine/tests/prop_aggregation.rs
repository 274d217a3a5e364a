//! Property-based tests for time parsing and availability aggregation.

use chrono::{TimeZone, Timelike, Utc};
use huddle_engine::ranking::MAX_RANKED_WINDOWS;
use huddle_engine::{
    compute_hour_buckets, local_to_utc, parse_time_string, rank_windows, utc_to_local,
    ClockTime, FixedClock, PlayerAvailability,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_timezone() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("UTC".to_string()),
        Just("cst".to_string()),
        Just("pacific".to_string()),
        Just("Europe/London".to_string()),
        Just("india".to_string()),
        Just("aedt".to_string()),
        Just("Asia/Tokyo".to_string()),
    ]
}

/// Mid-month instants, away from DST transitions.
fn arb_instant() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    (2025i32..=2027, 1u32..=12, 0u32..=23, 0u32..=59)
        .prop_map(|(y, m, h, min)| Utc.with_ymd_and_hms(y, m, 15, h, min, 0).unwrap())
}

fn arb_record() -> impl Strategy<Value = PlayerAvailability> {
    ("[a-e]", arb_timezone(), 0u32..24, 0u32..24).prop_map(|(name, tz, start, end)| PlayerAvailability {
        player_name: name,
        timezone: tz,
        start: ClockTime::new(start, 0).unwrap(),
        end: ClockTime::new(end, 0).unwrap(),
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn colon_form_parses_every_valid_time(h in 0u32..24, m in 0u32..60) {
        let t = parse_time_string(&format!("{h}:{m:02}")).unwrap();
        prop_assert_eq!((t.hour(), t.minute()), (h, m));
    }

    #[test]
    fn digit_run_parses_every_valid_time(h in 0u32..24, m in 0u32..60) {
        let t = parse_time_string(&format!("{h:02}{m:02}")).unwrap();
        prop_assert_eq!((t.hour(), t.minute()), (h, m));
    }

    #[test]
    fn twelve_hour_clock_matches_twenty_four(h in 0u32..24, m in 0u32..60) {
        let (h12, suffix) = match h {
            0 => (12, "am"),
            1..=11 => (h, "am"),
            12 => (12, "pm"),
            _ => (h - 12, "pm"),
        };
        let t = parse_time_string(&format!("{h12}:{m:02}{suffix}")).unwrap();
        prop_assert_eq!((t.hour(), t.minute()), (h, m));
    }

    #[test]
    fn parser_never_panics(raw in "\\PC{0,12}") {
        let _ = parse_time_string(&raw);
    }

    #[test]
    fn display_reparses_to_same_time(h in 0u32..24, m in 0u32..60) {
        let t = ClockTime::new(h, m).unwrap();
        prop_assert_eq!(parse_time_string(&t.to_string()).unwrap(), t);
    }

    #[test]
    fn local_round_trip_recovers_utc_hour(instant in arb_instant(), tz in arb_timezone()) {
        let local = utc_to_local(instant, &tz).unwrap();
        let back = local_to_utc(&local, &tz, &FixedClock(instant)).unwrap();
        prop_assert_eq!(back.hour(), instant.hour());
    }

    #[test]
    fn utc_window_covers_exactly_its_length(start in 0u32..24, end in 0u32..24) {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
        let record = PlayerAvailability {
            player_name: "p".to_string(),
            timezone: "UTC".to_string(),
            start: ClockTime::new(start, 0).unwrap(),
            end: ClockTime::new(end, 0).unwrap(),
        };
        let buckets = compute_hour_buckets(&[record], &clock);
        let covered = buckets.iter().filter(|(_, p)| p.contains("p")).count();
        prop_assert_eq!(covered as u32, (end + 24 - start) % 24);
    }

    #[test]
    fn ranking_is_sorted_and_bounded(records in prop::collection::vec(arb_record(), 0..12)) {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());
        let ranked = rank_windows(&compute_hour_buckets(&records, &clock));

        prop_assert!(ranked.len() <= MAX_RANKED_WINDOWS);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].count() >= pair[1].count());
            if pair[0].count() == pair[1].count() {
                prop_assert!(pair[0].start_hour < pair[1].start_hour);
            }
        }
        let any_available = records.iter().any(|r| r.start.hour() != r.end.hour());
        if any_available {
            prop_assert_eq!(ranked.len(), MAX_RANKED_WINDOWS);
        } else {
            prop_assert!(ranked.is_empty());
        }
    }
}
