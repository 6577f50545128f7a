//! Entry points for collaborators, with zone, clock and settings injected.

use chrono::{DateTime, Utc};

use crate::cloner::{self, SlugRegistry};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::event::Event;
use crate::exception::RecurrenceException;
use crate::generator::{OccurrenceGenerator, SeriesOptions};
use crate::holiday::HolidayWindow;
use crate::occurrence::Occurrence;
use crate::refresher::{self, NextStartStore, RefreshOutcome};
use crate::zone::{Clock, SystemClock, Zone};

/// Occurrence scheduling for one organization.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use occurrence_engine::{Event, FixedClock, RecurrenceRule, Scheduler, SeriesOptions, Zone};
///
/// let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let scheduler = Scheduler::new(Zone::default(), FixedClock(now));
///
/// let mut event = Event::new("Jazz night");
/// event.starts_at = Some(Utc.with_ymd_and_hms(2025, 1, 2, 20, 0, 0).unwrap());
/// event.recurrence = RecurrenceRule::weekly(Some(3));
///
/// let series = scheduler.build_occurrence_series(&event, &[], &[], &SeriesOptions::new(4));
/// assert_eq!(series.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler<C: Clock = SystemClock> {
    zone: Zone,
    clock: C,
    config: SchedulerConfig,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(zone: Zone, clock: C) -> Self {
        let config = SchedulerConfig {
            timezone: zone.name().to_string(),
            ..SchedulerConfig::default()
        };
        Self {
            zone,
            clock,
            config,
        }
    }

    /// # Errors
    /// Returns an error when the configuration does not validate.
    pub fn from_config(config: SchedulerConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let zone = config.zone()?;
        Ok(Self {
            zone,
            clock,
            config,
        })
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `now` plus the configured number of months.
    pub fn default_horizon(&self) -> DateTime<Utc> {
        self.config.default_horizon(&self.zone, self.now())
    }

    /// Options used by listing views: configured count and horizon, past included.
    pub fn listing_options(&self) -> SeriesOptions {
        SeriesOptions::new(self.config.max_occurrences)
            .include_past(true)
            .horizon_end(Some(self.default_horizon()))
    }

    fn generator(&self, now: DateTime<Utc>) -> OccurrenceGenerator<'_> {
        OccurrenceGenerator::new(&self.zone, now)
            .with_attempts_per_occurrence(self.config.attempts_per_occurrence)
    }

    /// Expand `event` into concrete occurrences, ordered by start.
    pub fn build_occurrence_series(
        &self,
        event: &Event,
        exceptions: &[RecurrenceException],
        holiday_windows: &[HolidayWindow],
        options: &SeriesOptions,
    ) -> Vec<Occurrence> {
        self.generator(self.now())
            .series(event, exceptions, holiday_windows, options)
    }

    /// Recompute the series (past included) and write the earliest upcoming start
    /// into `event.next_start` through `store`, only when it changed.
    ///
    /// `horizon_end` defaults to the configured horizon.
    ///
    /// # Errors
    /// Propagates the store's error; `event` is left untouched in that case.
    pub fn refresh_schedule<S: NextStartStore + ?Sized>(
        &self,
        event: &mut Event,
        exceptions: &[RecurrenceException],
        holiday_windows: &[HolidayWindow],
        max_occurrences: usize,
        horizon_end: Option<DateTime<Utc>>,
        store: &mut S,
    ) -> Result<RefreshOutcome> {
        let now = self.now();
        let horizon_end =
            horizon_end.or_else(|| Some(self.config.default_horizon(&self.zone, now)));
        let options = SeriesOptions::new(max_occurrences)
            .include_past(true)
            .horizon_end(horizon_end);
        let occurrences = self
            .generator(now)
            .series(event, exceptions, holiday_windows, &options);
        refresher::apply_refresh(event, occurrences, now, store)
    }

    /// Materialize the occurrence at `occurrence_start` as an override event.
    pub fn clone_for_occurrence<R: SlugRegistry + ?Sized>(
        &self,
        event: &Event,
        occurrence_start: DateTime<Utc>,
        registry: &R,
    ) -> Event {
        cloner::clone_for_occurrence(event, occurrence_start, &self.zone, registry)
    }
}
