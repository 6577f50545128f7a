//! Per-date exceptions to a recurring series and their resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::event::{Event, EventId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    #[default]
    Skip,
    Override,
    Holiday,
}

/// Identity of an exception: one record per `(series, occurrence_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExceptionKey {
    pub series: EventId,
    pub occurrence_start: DateTime<Utc>,
}

/// A single occurrence of a series that is skipped or replaced.
///
/// `override_event` is set only for [`ExceptionKind::Override`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceException {
    pub series: EventId,
    pub occurrence_start: DateTime<Utc>,
    #[serde(default)]
    pub kind: ExceptionKind,
    #[serde(default)]
    pub override_event: Option<Event>,
    #[serde(default)]
    pub note: String,
}

impl RecurrenceException {
    pub fn skip(series: EventId, occurrence_start: DateTime<Utc>) -> Self {
        Self {
            series,
            occurrence_start,
            kind: ExceptionKind::Skip,
            override_event: None,
            note: String::new(),
        }
    }

    pub fn holiday(series: EventId, occurrence_start: DateTime<Utc>) -> Self {
        Self {
            kind: ExceptionKind::Holiday,
            ..Self::skip(series, occurrence_start)
        }
    }

    pub fn with_override(
        series: EventId,
        occurrence_start: DateTime<Utc>,
        override_event: Event,
    ) -> Self {
        Self {
            series,
            occurrence_start,
            kind: ExceptionKind::Override,
            override_event: Some(override_event),
            note: String::new(),
        }
    }

    /// The skip record left behind when an override event is deleted.
    ///
    /// Returns `None` for events that do not override an occurrence.
    pub fn for_deleted_override(event: &Event) -> Option<Self> {
        Some(Self::skip(event.parent_series?, event.parent_occurrence_start?))
    }

    pub fn key(&self) -> ExceptionKey {
        ExceptionKey {
            series: self.series,
            occurrence_start: self.occurrence_start,
        }
    }

    /// Turn this record into a skip, handing back any override event so the
    /// caller can delete it.
    pub fn mark_skipped(&mut self) -> Option<Event> {
        self.kind = ExceptionKind::Skip;
        self.override_event.take()
    }

    /// The materialized override, if this is an override with one attached.
    pub fn active_override(&self) -> Option<&Event> {
        match self.kind {
            ExceptionKind::Override => self.override_event.as_ref(),
            ExceptionKind::Skip | ExceptionKind::Holiday => None,
        }
    }
}

/// What the generator should do with one candidate start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// No exception recorded for this date.
    Unchanged,
    /// Emit the override event's own times instead of the candidate.
    Override {
        exception: &'a RecurrenceException,
        event: &'a Event,
    },
    /// Drop this date; the series continues with the next candidate.
    Suppressed(&'a RecurrenceException),
}

/// Exceptions of one series indexed by occurrence start.
#[derive(Debug, Default)]
pub struct ExceptionResolver<'a> {
    by_start: HashMap<DateTime<Utc>, &'a RecurrenceException>,
}

impl<'a> ExceptionResolver<'a> {
    /// Index the exceptions that belong to `series`. Records of other series
    /// are ignored; a duplicate key keeps the first record.
    pub fn new(series: EventId, exceptions: &'a [RecurrenceException]) -> Self {
        let mut by_start = HashMap::with_capacity(exceptions.len());
        for exception in exceptions.iter().filter(|e| e.series == series) {
            if by_start.contains_key(&exception.occurrence_start) {
                tracing::warn!(
                    series = %series,
                    occurrence_start = %exception.occurrence_start,
                    "Duplicate recurrence exception ignored"
                );
                continue;
            }
            by_start.insert(exception.occurrence_start, exception);
        }
        Self { by_start }
    }

    /// The series date an override starting at `start` replaced, if any.
    pub fn replaced_start(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.by_start
            .values()
            .filter(|exception| {
                exception
                    .active_override()
                    .is_some_and(|event| event.starts_at == Some(start))
            })
            .map(|exception| exception.occurrence_start)
            .min()
    }

    /// Earliest series date before `anchor` whose override was moved to
    /// `anchor` or later.
    pub fn moved_past(&self, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.by_start
            .values()
            .filter(|exception| exception.occurrence_start < anchor)
            .filter(|exception| {
                exception
                    .active_override()
                    .and_then(|event| event.starts_at)
                    .is_some_and(|start| start >= anchor)
            })
            .map(|exception| exception.occurrence_start)
            .min()
    }

    pub fn resolve(&self, candidate: DateTime<Utc>) -> Resolution<'a> {
        match self.by_start.get(&candidate).copied() {
            None => Resolution::Unchanged,
            Some(exception) => match exception.active_override() {
                Some(event) => Resolution::Override { exception, event },
                None => Resolution::Suppressed(exception),
            },
        }
    }
}
