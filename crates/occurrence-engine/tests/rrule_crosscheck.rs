//! Cross-checks against the `rrule` crate for the shapes that have an exact
//! RFC 5545 equivalent.
//!
//! Weekly and biweekly rules map to `FREQ=WEEKLY[;INTERVAL=2];BYDAY=..`.
//! Monthly on a day number maps to `BYMONTHDAY`, and a clamped day 31 to
//! `BYMONTHDAY=-1`. The n-th weekday maps to `BYSETPOS`, and the fifth with
//! last-match fallback to `BYSETPOS=-1`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use occurrence_engine::{Event, FixedClock, RecurrenceRule, Scheduler, SeriesOptions, Zone};
use rrule::RRuleSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand with the `rrule` crate from a local DTSTART in `tz`.
fn rfc_starts(tz: &str, dtstart: &str, rrule: &str, count: u16) -> Vec<DateTime<Utc>> {
    let text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        tz,
        dtstart.replace(['-', ':'], ""),
        rrule
    );
    let set: RRuleSet = text.parse().expect("rrule should parse");
    set.all(count)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect()
}

/// Expand with the engine from the same local DTSTART.
fn engine_starts(tz: &str, dtstart: &str, rule: RecurrenceRule, count: usize) -> Vec<DateTime<Utc>> {
    let zone = Zone::parse(tz).expect("zone should parse");
    let local = chrono::NaiveDateTime::parse_from_str(dtstart, "%Y-%m-%dT%H:%M:%S")
        .expect("dtstart should parse");
    let now = Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    );
    let scheduler = Scheduler::new(zone, FixedClock(now));

    let mut event = Event::new("Cross-check");
    event.starts_at = Some(zone.localize(local));
    event.recurrence = rule;

    scheduler
        .build_occurrence_series(&event, &[], &[], &SeriesOptions::new(count).include_past(true))
        .into_iter()
        .map(|o| o.start)
        .collect()
}

fn assert_same(tz: &str, dtstart: &str, rrule: &str, rule: RecurrenceRule, count: usize) {
    let expected = rfc_starts(tz, dtstart, rrule, count as u16);
    let actual = engine_starts(tz, dtstart, rule, count);
    assert_eq!(expected.len(), count, "rrule produced a short series");
    assert_eq!(actual, expected, "{} in {} from {}", rrule, tz, dtstart);
}

// ---------------------------------------------------------------------------
// Weekly shapes
// ---------------------------------------------------------------------------

#[test]
fn weekly_thursday_matches_rrule() {
    assert_same(
        "UTC",
        "2025-01-02T20:00:00",
        "FREQ=WEEKLY;BYDAY=TH",
        RecurrenceRule::weekly(Some(3)),
        30,
    );
}

#[test]
fn weekly_across_dst_matches_rrule() {
    assert_same(
        "Europe/Berlin",
        "2026-02-05T20:00:00",
        "FREQ=WEEKLY;BYDAY=TH",
        RecurrenceRule::weekly(Some(3)),
        40,
    );
    assert_same(
        "America/New_York",
        "2025-10-03T21:30:00",
        "FREQ=WEEKLY;BYDAY=FR",
        RecurrenceRule::weekly(Some(4)),
        40,
    );
}

#[test]
fn biweekly_tuesday_matches_rrule() {
    assert_same(
        "Europe/Berlin",
        "2026-03-03T19:00:00",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU",
        RecurrenceRule::biweekly(Some(1)),
        26,
    );
}

// ---------------------------------------------------------------------------
// Monthly shapes
// ---------------------------------------------------------------------------

#[test]
fn monthly_by_date_matches_rrule() {
    assert_same(
        "America/New_York",
        "2025-01-15T20:00:00",
        "FREQ=MONTHLY;BYMONTHDAY=15",
        RecurrenceRule::monthly_by_date(Some(15)),
        24,
    );
}

#[test]
fn monthly_day_31_matches_last_day_of_month() {
    assert_same(
        "UTC",
        "2025-01-31T20:00:00",
        "FREQ=MONTHLY;BYMONTHDAY=-1",
        RecurrenceRule::monthly_by_date(Some(31)),
        24,
    );
}

#[test]
fn second_thursday_matches_rrule() {
    assert_same(
        "Europe/Berlin",
        "2025-01-09T20:00:00",
        "FREQ=MONTHLY;BYDAY=TH;BYSETPOS=2",
        RecurrenceRule::monthly_by_weekday(Some(3), Some(2)),
        24,
    );
}

#[test]
fn fifth_thursday_matches_last_thursday() {
    assert_same(
        "UTC",
        "2025-01-30T20:00:00",
        "FREQ=MONTHLY;BYDAY=TH;BYSETPOS=-1",
        RecurrenceRule::monthly_by_weekday(Some(3), Some(5)),
        24,
    );
}
