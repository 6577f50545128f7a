//! Keeps the cached `next_start` pointer of an event in sync with its series.
//!
//! The cache is advisory: it serves list ordering and simple queries, and the
//! generator can always be re-run for the authoritative series. Two refreshes
//! racing on one event resolve last-writer-wins unless the store rejects a
//! stale `previous` value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Result, ScheduleError};
use crate::event::{Event, EventId};
use crate::occurrence::Occurrence;

/// Persistence for the cached next start.
pub trait NextStartStore {
    /// Persist `next` for `event`. `previous` is the value the refresher read,
    /// so an implementation may reject the write when it no longer matches.
    ///
    /// # Errors
    /// Implementations return `ScheduleError::Store` when the write fails.
    fn store_next_start(
        &mut self,
        event: EventId,
        previous: Option<DateTime<Utc>>,
        next: Option<DateTime<Utc>>,
    ) -> Result<()>;
}

/// In-process store with compare-and-set semantics, counting writes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    values: HashMap<EventId, Option<DateTime<Utc>>>,
    writes: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored value for an event without counting a write.
    pub fn seed(&mut self, event: EventId, value: Option<DateTime<Utc>>) {
        self.values.insert(event, value);
    }

    pub fn get(&self, event: EventId) -> Option<DateTime<Utc>> {
        self.values.get(&event).copied().flatten()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl NextStartStore for InMemoryStore {
    fn store_next_start(
        &mut self,
        event: EventId,
        previous: Option<DateTime<Utc>>,
        next: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let Some(current) = self.values.get(&event) {
            if *current != previous {
                return Err(ScheduleError::Store(format!(
                    "next_start of event {} changed concurrently",
                    event
                )));
            }
        }
        self.values.insert(event, next);
        self.writes += 1;
        Ok(())
    }
}

/// Result of one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub next_start: Option<DateTime<Utc>>,
    /// Whether a write went to the store.
    pub changed: bool,
    /// The series computed with past occurrences included.
    pub occurrences: Vec<Occurrence>,
}

/// Apply a freshly computed series to `event`, writing only on change.
///
/// Recurring events cache the earliest occurrence starting at or after
/// `now`; anything else has a stale cache cleared.
pub(crate) fn apply_refresh<S: NextStartStore + ?Sized>(
    event: &mut Event,
    occurrences: Vec<Occurrence>,
    now: DateTime<Utc>,
    store: &mut S,
) -> Result<RefreshOutcome> {
    let upcoming = if event.is_recurring() {
        occurrences
            .iter()
            .map(|occurrence| occurrence.start)
            .filter(|start| *start >= now)
            .min()
    } else {
        None
    };

    let previous = event.next_start;
    if previous == upcoming {
        tracing::trace!(event_id = %event.id, "next_start unchanged");
        return Ok(RefreshOutcome {
            next_start: upcoming,
            changed: false,
            occurrences,
        });
    }

    store.store_next_start(event.id, previous, upcoming)?;
    event.next_start = upcoming;
    match upcoming {
        Some(next) => tracing::debug!(event_id = %event.id, next_start = %next, "next_start updated"),
        None => tracing::debug!(event_id = %event.id, "next_start cleared"),
    }

    Ok(RefreshOutcome {
        next_start: upcoming,
        changed: true,
        occurrences,
    })
}
