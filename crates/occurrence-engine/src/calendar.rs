//! Plain calendar arithmetic on local dates: month lengths, month stepping,
//! and n-th weekday lookup.
//!
//! Nothing here knows about time zones; callers convert to local wall time first.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

/// Number of days in the given month (28..=31).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// The (year, month) pair following the given one.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Build a date, clamping `day` into the month instead of rolling over.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Day of month of the `nth` (1-based) `weekday` in the given month.
///
/// When the month has fewer than `nth` such weekdays (a "5th Thursday" in a
/// four-Thursday month), the last one is returned. `nth == 0` is treated as 1.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, nth: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 1;
    };
    let lead = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let first_match = 1 + lead;
    let last_day = days_in_month(year, month);
    let count = (last_day - first_match) / 7 + 1;
    let index = nth.max(1).min(count) - 1;
    first_match + index * 7
}

/// Add (or subtract) calendar months, clamping the day to the target month.
///
/// Jan 31 + 1 month is Feb 28 (or 29 in a leap year), never early March.
pub fn add_months(value: NaiveDateTime, delta: i32) -> NaiveDateTime {
    let zero_based = value.year() * 12 + value.month0() as i32 + delta;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    match clamped_date(year, month, value.day()) {
        Some(date) => date.and_time(value.time()),
        None => value,
    }
}
