//! The occurrence generator: walks a series from its anchor, applying
//! exceptions and holiday windows, until the count, the horizon, or the
//! stepping-attempts cap is reached.
//!
//! The walk is a pure function of its inputs and the injected `now`; the
//! same inputs always give the same series.

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_ATTEMPTS_PER_OCCURRENCE;
use crate::event::Event;
use crate::exception::{ExceptionResolver, RecurrenceException, Resolution};
use crate::holiday::{HolidayFilter, HolidayWindow};
use crate::occurrence::Occurrence;
use crate::zone::Zone;

/// Bounds for one generator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesOptions {
    pub max_occurrences: usize,
    /// Keep occurrences that start before now.
    pub include_past: bool,
    /// Last instant a generated start may fall on (inclusive).
    pub horizon_end: Option<DateTime<Utc>>,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            max_occurrences: 6,
            include_past: false,
            horizon_end: None,
        }
    }
}

impl SeriesOptions {
    pub fn new(max_occurrences: usize) -> Self {
        Self {
            max_occurrences,
            ..Self::default()
        }
    }

    pub fn include_past(mut self, include_past: bool) -> Self {
        self.include_past = include_past;
        self
    }

    pub fn horizon_end(mut self, horizon_end: Option<DateTime<Utc>>) -> Self {
        self.horizon_end = horizon_end;
        self
    }

    fn within_horizon(&self, start: DateTime<Utc>) -> bool {
        self.horizon_end.is_none_or(|horizon| start <= horizon)
    }
}

/// Why the recurring walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Filled,
    Horizon,
    PatternEnded,
    AttemptsExhausted,
}

/// Expands one event into occurrences for a fixed zone and "now".
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceGenerator<'z> {
    zone: &'z Zone,
    now: DateTime<Utc>,
    attempts_per_occurrence: usize,
}

impl<'z> OccurrenceGenerator<'z> {
    pub fn new(zone: &'z Zone, now: DateTime<Utc>) -> Self {
        Self {
            zone,
            now,
            attempts_per_occurrence: DEFAULT_ATTEMPTS_PER_OCCURRENCE,
        }
    }

    pub fn with_attempts_per_occurrence(mut self, attempts: usize) -> Self {
        self.attempts_per_occurrence = attempts.max(1);
        self
    }

    /// Build the ordered occurrence list for `event`.
    ///
    /// Manual dates take precedence over the recurrence rule and ignore
    /// exceptions and holiday windows. A non-repeating event yields its
    /// anchor only. A missing anchor yields an empty list.
    pub fn series(
        &self,
        event: &Event,
        exceptions: &[RecurrenceException],
        holiday_windows: &[HolidayWindow],
        options: &SeriesOptions,
    ) -> Vec<Occurrence> {
        if options.max_occurrences == 0 {
            return Vec::new();
        }

        let manual = if event.has_manual_occurrences() {
            event.manual_occurrence_datetimes(self.zone)
        } else {
            Vec::new()
        };
        if !manual.is_empty() {
            return self.manual_series(event, &manual, options);
        }

        let resolver = ExceptionResolver::new(event.id, exceptions);
        let Some(anchor) = self.anchor(event, &resolver) else {
            return Vec::new();
        };

        if !event.is_recurring() {
            let occurrence = self.plain_occurrence(event, anchor);
            return if self.keep(occurrence.start, options) {
                vec![occurrence]
            } else {
                Vec::new()
            };
        }

        self.recurring_series(event, anchor, &resolver, holiday_windows, options)
    }

    /// The start the walk begins from.
    ///
    /// A cached `next_start` that points at a moved override is mapped back to
    /// the series date it replaced, so the walk stays on the pattern's phase.
    /// An earlier date whose override was postponed to the cached start or
    /// later pulls the anchor back to that date.
    fn anchor(&self, event: &Event, resolver: &ExceptionResolver<'_>) -> Option<DateTime<Utc>> {
        let anchor = event.anchor_start()?;
        if !event.is_recurring() || event.next_start != Some(anchor) {
            return Some(anchor);
        }
        let anchor = resolver.replaced_start(anchor).unwrap_or(anchor);
        Some(resolver.moved_past(anchor).unwrap_or(anchor))
    }

    fn keep(&self, start: DateTime<Utc>, options: &SeriesOptions) -> bool {
        options.within_horizon(start) && (options.include_past || start >= self.now)
    }

    fn plain_occurrence(&self, event: &Event, start: DateTime<Utc>) -> Occurrence {
        let offsets = event.offsets();
        Occurrence {
            event: event.id,
            start,
            doors: offsets.doors_at(start),
            end: offsets.end_at(start),
            curfew: offsets.curfew_at(start),
            is_override: false,
            source_exception: None,
        }
    }

    fn manual_series(
        &self,
        event: &Event,
        dates: &[DateTime<Utc>],
        options: &SeriesOptions,
    ) -> Vec<Occurrence> {
        dates
            .iter()
            .copied()
            .filter(|start| self.keep(*start, options))
            .take(options.max_occurrences)
            .map(|start| self.plain_occurrence(event, start))
            .collect()
    }

    fn recurring_series(
        &self,
        event: &Event,
        anchor: DateTime<Utc>,
        resolver: &ExceptionResolver<'_>,
        holiday_windows: &[HolidayWindow],
        options: &SeriesOptions,
    ) -> Vec<Occurrence> {
        let holidays = HolidayFilter::new(holiday_windows);
        let max_attempts = options
            .max_occurrences
            .saturating_mul(self.attempts_per_occurrence);

        let time_of_day = self.zone.to_local(event.starts_at.unwrap_or(anchor)).time();

        let mut occurrences = Vec::new();
        let mut attempts = 0;
        let mut current = anchor;
        let mut stop = Stop::AttemptsExhausted;

        while attempts < max_attempts {
            attempts += 1;
            if !options.within_horizon(current) {
                stop = Stop::Horizon;
                break;
            }

            match resolver.resolve(current) {
                Resolution::Override { exception, event: replacement } => {
                    let start = replacement.starts_at.unwrap_or(current);
                    if !options.within_horizon(start) {
                        stop = Stop::Horizon;
                        break;
                    }
                    if options.include_past || start >= self.now {
                        occurrences.push(Occurrence {
                            event: replacement.id,
                            start,
                            doors: replacement.doors_at,
                            end: replacement.ends_at,
                            curfew: replacement.curfew_at,
                            is_override: true,
                            source_exception: Some(exception.key()),
                        });
                    }
                }
                Resolution::Suppressed(_) => {}
                Resolution::Unchanged => {
                    if let Some(window) = holidays.blocking_window(event.event_type, current) {
                        tracing::trace!(
                            event_id = %event.id,
                            start = %current,
                            holiday = %window.name,
                            "Occurrence suppressed by holiday window"
                        );
                    } else if options.include_past || current >= self.now {
                        occurrences.push(self.plain_occurrence(event, current));
                    }
                }
            }

            if occurrences.len() >= options.max_occurrences {
                stop = Stop::Filled;
                break;
            }

            match event.recurrence.next_after(current, time_of_day, self.zone) {
                Some(next) if next > current => current = next,
                _ => {
                    stop = Stop::PatternEnded;
                    break;
                }
            }
        }

        if stop == Stop::AttemptsExhausted {
            tracing::warn!(
                event_id = %event.id,
                attempts,
                collected = occurrences.len(),
                requested = options.max_occurrences,
                "Stepping-attempts cap reached; series truncated"
            );
        }

        // Overrides keep their series slot but may be moved past later dates.
        occurrences.sort_by_key(|occurrence| occurrence.start);
        occurrences
    }
}
