//! Injected time sources: the organization time zone and the clock.
//!
//! Stored instants are always `DateTime<Utc>`. Calendar decisions (which
//! weekday, which month, which day) are made on the wall time of a [`Zone`].

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::{Result, ScheduleError};

/// Source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The organization's configured time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    tz: Tz,
}

impl Default for Zone {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Zone {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA identifier such as `"Europe/Berlin"`.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimezone` for unknown identifiers.
    pub fn parse(name: &str) -> Result<Self> {
        Tz::from_str(name.trim())
            .map(Self::new)
            .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Wall-clock time of `instant` in this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    /// Interpret a naive wall-clock value as local time in this zone.
    ///
    /// A repeated wall time (DST fold) resolves to the earlier instant. A wall
    /// time inside a DST gap is moved forward by the length of the gap, using
    /// the offset in effect just before the transition.
    pub fn localize(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                let before = local - Duration::days(1);
                let offset = self.tz.offset_from_utc_datetime(&before).fix();
                let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
                Utc.from_utc_datetime(&utc)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parse_rejects_unknown_zone() {
        assert!(Zone::parse("Mars/Olympus_Mons").is_err());
        assert_eq!(Zone::parse("Europe/Berlin").unwrap().name(), "Europe/Berlin");
    }

    #[test]
    fn localize_regular_time() {
        let zone = Zone::parse("Europe/Berlin").unwrap();
        let instant = zone.localize(local(2025, 1, 2, 20, 0));
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 1, 2, 19, 0, 0).unwrap());
        assert_eq!(zone.to_local(instant), local(2025, 1, 2, 20, 0));
    }

    #[test]
    fn localize_gap_shifts_forward() {
        // 2026-03-29 02:30 does not exist in Berlin (clocks jump 02:00 -> 03:00).
        let zone = Zone::parse("Europe/Berlin").unwrap();
        let instant = zone.localize(local(2026, 3, 29, 2, 30));
        assert_eq!(zone.to_local(instant), local(2026, 3, 29, 3, 30));
    }

    #[test]
    fn localize_fold_picks_earliest() {
        // 2026-10-25 02:30 happens twice in Berlin; the first is still CEST (UTC+2).
        let zone = Zone::parse("Europe/Berlin").unwrap();
        let instant = zone.localize(local(2026, 10, 25, 2, 30));
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 10, 25, 0, 30, 0).unwrap());
    }

    #[test]
    fn fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!((&clock).now(), at);
    }
}
