//! Tests for hour bucketing and window ranking.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use huddle_engine::buckets::HourBuckets;
use huddle_engine::ranking::{window_label, MAX_RANKED_WINDOWS};
use huddle_engine::{
    compute_hour_buckets, rank_windows, suggest_meeting_times, ClockTime, FixedClock,
    PlayerAvailability,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn winter() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap())
}

fn player(name: &str, tz: &str, start: (u32, u32), end: (u32, u32)) -> PlayerAvailability {
    PlayerAvailability {
        player_name: name.to_string(),
        timezone: tz.to_string(),
        start: ClockTime::new(start.0, start.1).unwrap(),
        end: ClockTime::new(end.0, end.1).unwrap(),
    }
}

fn utc_player(name: &str, start_hour: u32, end_hour: u32) -> PlayerAvailability {
    player(name, "UTC", (start_hour, 0), (end_hour, 0))
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn hours_of(buckets: &HourBuckets, name: &str) -> Vec<usize> {
    buckets
        .iter()
        .filter(|(_, players)| players.contains(name))
        .map(|(hour, _)| hour)
        .collect()
}

// ── compute_hour_buckets ────────────────────────────────────────────────────

#[test]
fn window_fills_start_inclusive_end_exclusive() {
    let buckets = compute_hour_buckets(&[utc_player("ana", 14, 17)], &winter());
    assert_eq!(hours_of(&buckets, "ana"), vec![14, 15, 16]);
}

#[test]
fn window_crossing_midnight_wraps() {
    let buckets = compute_hour_buckets(&[utc_player("ana", 23, 2)], &winter());
    assert_eq!(hours_of(&buckets, "ana"), vec![0, 1, 23]);
    assert!(!buckets.players(2).contains("ana"));
}

#[test]
fn local_window_is_shifted_to_utc() {
    // 17:00-22:00 CST is 23:00-04:00 UTC in January.
    let buckets = compute_hour_buckets(&[player("bo", "America/Chicago", (17, 0), (22, 0))], &winter());
    assert_eq!(hours_of(&buckets, "bo"), vec![0, 1, 2, 3, 23]);
}

#[test]
fn minutes_are_dropped_before_bucketing() {
    // 17:45-19:15 UTC counts as hours 17 and 18.
    let buckets = compute_hour_buckets(&[player("cy", "UTC", (17, 45), (19, 15))], &winter());
    assert_eq!(hours_of(&buckets, "cy"), vec![17, 18]);
}

#[test]
fn same_start_and_end_hour_is_zero_width() {
    let records = [
        utc_player("ana", 10, 10),
        player("bo", "UTC", (10, 0), (10, 30)),
    ];
    let buckets = compute_hour_buckets(&records, &winter());
    assert!(buckets.is_empty());
    assert!(buckets.skipped().is_empty());
}

#[test]
fn bad_record_is_skipped_without_aborting() {
    let records = [
        utc_player("ana", 14, 16),
        player("ghost", "Not/A_Zone", (14, 0), (16, 0)),
        utc_player("bo", 15, 17),
    ];
    let buckets = compute_hour_buckets(&records, &winter());
    assert_eq!(buckets.skipped(), ["ghost".to_string()]);
    assert_eq!(buckets.players(15), &names(&["ana", "bo"]));
    assert!(buckets.iter().all(|(_, p)| !p.contains("ghost")));
}

#[test]
fn stored_alias_is_still_accepted() {
    let buckets = compute_hour_buckets(&[player("dee", "pst", (9, 0), (10, 0))], &winter());
    // 09:00 PST is 17:00 UTC.
    assert_eq!(hours_of(&buckets, "dee"), vec![17]);
}

#[test]
fn player_counted_once_per_hour() {
    let buckets = compute_hour_buckets(&[utc_player("ana", 8, 10), utc_player("ana", 8, 10)], &winter());
    assert_eq!(buckets.players(8).len(), 1);
}

#[test]
fn add_window_wraps_indices() {
    let mut buckets = HourBuckets::new();
    buckets.add_window("ana", 22, 25);
    assert_eq!(hours_of(&buckets, "ana"), vec![0, 22, 23]);
}

// ── rank_windows ────────────────────────────────────────────────────────────

#[test]
fn empty_buckets_rank_nothing() {
    assert!(rank_windows(&HourBuckets::new()).is_empty());
    assert!(suggest_meeting_times(&[], &winter()).is_empty());
}

#[test]
fn only_skipped_records_rank_nothing() {
    let bad = PlayerAvailability {
        timezone: "Mars/Olympus_Mons".to_string(),
        ..utc_player("A", 10, 12)
    };
    assert!(suggest_meeting_times(&[bad], &winter()).is_empty());
}

#[test]
fn single_player_is_padded_to_six_windows() {
    let ranked = suggest_meeting_times(&[utc_player("A", 14, 15)], &winter());
    let summary: Vec<(&str, usize)> = ranked.iter().map(|w| (w.label.as_str(), w.count())).collect();
    assert_eq!(
        summary,
        vec![
            ("13:00–15:00", 1),
            ("14:00–16:00", 1),
            ("00:00–02:00", 0),
            ("01:00–03:00", 0),
            ("02:00–04:00", 0),
            ("03:00–05:00", 0),
        ]
    );
}

#[test]
fn single_busy_hour_appears_in_both_windows_that_cover_it() {
    let mut buckets = HourBuckets::new();
    for name in ["A", "B", "C"] {
        buckets.add_window(name, 14, 15);
    }
    let ranked = rank_windows(&buckets);

    assert_eq!(ranked.len(), MAX_RANKED_WINDOWS);
    // Both windows hold all three players; the tie keeps ascending hour order.
    assert_eq!(ranked[0].label, "13:00–15:00");
    assert_eq!(ranked[1].label, "14:00–16:00");
    assert_eq!(ranked[1].count(), 3);
    assert_eq!(ranked[1].players, names(&["A", "B", "C"]));
    // The rest is padded with the earliest empty windows.
    let padding: Vec<(usize, usize)> = ranked[2..].iter().map(|w| (w.start_hour, w.count())).collect();
    assert_eq!(padding, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
}

#[test]
fn ties_resolve_to_the_earlier_hour() {
    let records = [utc_player("A", 10, 11), utc_player("B", 15, 16)];
    let ranked = suggest_meeting_times(&records, &winter());
    let labels: Vec<&str> = ranked.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "09:00–11:00",
            "10:00–12:00",
            "14:00–16:00",
            "15:00–17:00",
            "00:00–02:00",
            "01:00–03:00",
        ]
    );
}

#[test]
fn ranks_by_distinct_participants_and_truncates() {
    let records = [
        utc_player("A", 14, 18),
        utc_player("B", 15, 17),
        utc_player("C", 16, 20),
    ];
    let ranked = suggest_meeting_times(&records, &winter());

    assert_eq!(ranked.len(), MAX_RANKED_WINDOWS);
    let summary: Vec<(usize, usize)> = ranked.iter().map(|w| (w.start_hour, w.count())).collect();
    assert_eq!(summary, vec![(15, 3), (16, 3), (14, 2), (17, 2), (13, 1), (18, 1)]);
}

#[test]
fn union_counts_a_player_once() {
    let ranked = suggest_meeting_times(&[utc_player("A", 8, 12)], &winter());
    assert!(ranked.iter().all(|w| w.count() <= 1));
    assert_eq!(ranked.iter().filter(|w| w.count() == 1).count(), 5);
}

#[test]
fn window_after_midnight_hour_wraps_label_and_union() {
    let mut buckets = HourBuckets::new();
    buckets.add_window("late", 23, 0);
    buckets.add_window("early", 0, 1);
    let ranked = rank_windows(&buckets);
    assert_eq!(ranked[0].label, "23:00–01:00");
    assert_eq!(ranked[0].players, names(&["early", "late"]));
}

#[test]
fn labels_use_end_boundary_two_hours_later() {
    assert_eq!(window_label(0), "00:00–02:00");
    assert_eq!(window_label(22), "22:00–00:00");
    assert_eq!(window_label(23), "23:00–01:00");
}

#[test]
fn never_more_than_six_windows() {
    let records: Vec<PlayerAvailability> = (0..24)
        .step_by(3)
        .map(|h| utc_player(&format!("p{h}"), h, h + 1))
        .collect();
    let ranked = suggest_meeting_times(&records, &winter());
    assert_eq!(ranked.len(), MAX_RANKED_WINDOWS);
}
