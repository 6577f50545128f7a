//! Organization-wide blackout windows that suppress recurring occurrences.
//!
//! A window never shifts a series; it only hides the candidates that start
//! inside it, and the pattern resumes on its normal phase afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::EventType;

/// A blackout span such as a summer closure or a public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayWindow {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub applies_to_public: bool,
    #[serde(default = "default_true")]
    pub applies_to_internal: bool,
    #[serde(default)]
    pub note: String,
}

fn default_true() -> bool {
    true
}

impl HolidayWindow {
    pub fn new(name: impl Into<String>, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            starts_at,
            ends_at,
            applies_to_public: true,
            applies_to_internal: true,
            note: String::new(),
        }
    }

    pub fn applies_to(&self, event_type: EventType) -> bool {
        match event_type {
            EventType::Public => self.applies_to_public,
            EventType::Internal => self.applies_to_internal,
        }
    }

    /// Both ends are inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.starts_at <= instant && instant <= self.ends_at
    }

    /// Windows intersecting `[start, end]`; an open bound matches everything on that side.
    pub fn overlapping<'a>(
        windows: &'a [HolidayWindow],
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<&'a HolidayWindow> {
        windows
            .iter()
            .filter(|w| start.is_none_or(|start| w.ends_at >= start))
            .filter(|w| end.is_none_or(|end| w.starts_at <= end))
            .collect()
    }
}

/// Decides whether a candidate start of a recurring event falls in a blackout.
#[derive(Debug, Clone, Copy)]
pub struct HolidayFilter<'a> {
    windows: &'a [HolidayWindow],
}

impl<'a> HolidayFilter<'a> {
    pub fn new(windows: &'a [HolidayWindow]) -> Self {
        Self { windows }
    }

    /// The first window that suppresses `start` for an event of `event_type`.
    pub fn blocking_window(
        &self,
        event_type: EventType,
        start: DateTime<Utc>,
    ) -> Option<&'a HolidayWindow> {
        self.windows
            .iter()
            .find(|w| w.applies_to(event_type) && w.contains(start))
    }

    pub fn blocks(&self, event_type: EventType, start: DateTime<Utc>) -> bool {
        self.blocking_window(event_type, start).is_some()
    }
}
