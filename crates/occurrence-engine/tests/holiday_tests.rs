//! Tests for holiday windows: blocking, classification flags, phase keeping.

use chrono::{DateTime, TimeZone, Utc};
use occurrence_engine::holiday::HolidayFilter;
use occurrence_engine::{
    Event, EventType, FixedClock, HolidayWindow, RecurrenceRule, Scheduler, SeriesOptions, Zone,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn scheduler() -> Scheduler<FixedClock> {
    Scheduler::new(Zone::default(), FixedClock(utc(2025, 1, 1, 0, 0)))
}

fn weekly_thursday(event_type: EventType) -> Event {
    let mut event = Event::new("Jazz night");
    event.event_type = event_type;
    event.starts_at = Some(utc(2025, 1, 2, 20, 0));
    event.recurrence = RecurrenceRule::weekly(Some(3));
    event
}

fn starts(series: &[occurrence_engine::Occurrence]) -> Vec<DateTime<Utc>> {
    series.iter().map(|o| o.start).collect()
}

// ── Blocking and phase ──────────────────────────────────────────────────────

#[test]
fn window_blocks_and_series_resumes_on_phase() {
    let event = weekly_thursday(EventType::Public);
    let holidays = vec![HolidayWindow::new(
        "Winter break",
        utc(2025, 1, 8, 0, 0),
        utc(2025, 1, 17, 0, 0),
    )];

    let series =
        scheduler().build_occurrence_series(&event, &[], &holidays, &SeriesOptions::new(4));

    assert_eq!(
        starts(&series),
        vec![
            utc(2025, 1, 2, 20, 0),
            utc(2025, 1, 23, 20, 0),
            utc(2025, 1, 30, 20, 0),
            utc(2025, 2, 6, 20, 0),
        ]
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let event = weekly_thursday(EventType::Public);
    let ends_on_start = HolidayWindow::new(
        "Ends at showtime",
        utc(2025, 1, 9, 0, 0),
        utc(2025, 1, 9, 20, 0),
    );
    let starts_on_start = HolidayWindow::new(
        "Starts at showtime",
        utc(2025, 1, 16, 20, 0),
        utc(2025, 1, 17, 0, 0),
    );

    let series = scheduler().build_occurrence_series(
        &event,
        &[],
        &[ends_on_start, starts_on_start],
        &SeriesOptions::new(2),
    );

    assert_eq!(
        starts(&series),
        vec![utc(2025, 1, 2, 20, 0), utc(2025, 1, 23, 20, 0)]
    );
}

#[test]
fn window_for_internal_only_leaves_public_events() {
    let mut window = HolidayWindow::new("Staff retreat", utc(2025, 1, 1, 0, 0), utc(2025, 1, 31, 0, 0));
    window.applies_to_public = false;
    let holidays = vec![window];

    let public = scheduler().build_occurrence_series(
        &weekly_thursday(EventType::Public),
        &[],
        &holidays,
        &SeriesOptions::new(2),
    );
    let internal = scheduler().build_occurrence_series(
        &weekly_thursday(EventType::Internal),
        &[],
        &holidays,
        &SeriesOptions::new(2),
    );

    assert_eq!(public[0].start, utc(2025, 1, 2, 20, 0));
    assert_eq!(internal[0].start, utc(2025, 2, 6, 20, 0));
}

#[test]
fn window_never_blocks_single_events() {
    let mut event = Event::new("Album release");
    event.starts_at = Some(utc(2025, 1, 9, 20, 0));
    let holidays = vec![HolidayWindow::new(
        "Closed",
        utc(2025, 1, 1, 0, 0),
        utc(2025, 1, 31, 0, 0),
    )];

    let series =
        scheduler().build_occurrence_series(&event, &[], &holidays, &SeriesOptions::new(1));

    assert_eq!(series.len(), 1);
}

// ── Filter and lookup ───────────────────────────────────────────────────────

#[test]
fn filter_reports_blocking_window() {
    let mut closed = HolidayWindow::new("Closed", utc(2025, 12, 24, 0, 0), utc(2025, 12, 26, 23, 59));
    closed.applies_to_internal = false;
    let holidays = vec![closed];
    let filter = HolidayFilter::new(&holidays);

    let hit = filter.blocking_window(EventType::Public, utc(2025, 12, 25, 20, 0));
    assert_eq!(hit.map(|w| w.name.as_str()), Some("Closed"));
    assert!(!filter.blocks(EventType::Internal, utc(2025, 12, 25, 20, 0)));
    assert!(!filter.blocks(EventType::Public, utc(2025, 12, 27, 20, 0)));
}

#[test]
fn overlapping_selects_intersecting_windows() {
    let windows = vec![
        HolidayWindow::new("Before", utc(2025, 1, 1, 0, 0), utc(2025, 1, 10, 0, 0)),
        HolidayWindow::new("Touching", utc(2025, 1, 10, 0, 0), utc(2025, 1, 15, 0, 0)),
        HolidayWindow::new("Inside", utc(2025, 2, 1, 0, 0), utc(2025, 2, 2, 0, 0)),
        HolidayWindow::new("After", utc(2025, 4, 1, 0, 0), utc(2025, 4, 2, 0, 0)),
    ];

    let names = |found: Vec<&HolidayWindow>| -> Vec<String> {
        found.into_iter().map(|w| w.name.clone()).collect()
    };

    let found = HolidayWindow::overlapping(
        &windows,
        Some(utc(2025, 1, 10, 0, 0)),
        Some(utc(2025, 3, 1, 0, 0)),
    );
    assert_eq!(names(found), vec!["Before", "Touching", "Inside"]);

    let found = HolidayWindow::overlapping(&windows, Some(utc(2025, 3, 1, 0, 0)), None);
    assert_eq!(names(found), vec!["After"]);

    let found = HolidayWindow::overlapping(&windows, None, None);
    assert_eq!(found.len(), 4);
}

#[test]
fn window_deserializes_with_default_flags() {
    let window: HolidayWindow = serde_json::from_str(
        r#"{"name":"Summer","starts_at":"2025-07-01T00:00:00Z","ends_at":"2025-07-31T23:59:00Z"}"#,
    )
    .expect("window should deserialize");

    assert!(window.applies_to_public);
    assert!(window.applies_to_internal);
    assert!(window.contains(utc(2025, 7, 15, 20, 0)));
}
