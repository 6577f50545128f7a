//! Computed occurrences. Never persisted; produced fresh on every call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::exception::ExceptionKey;

/// One concrete calendar instance of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// The series itself, or the override event that replaced this date.
    pub event: EventId,
    pub start: DateTime<Utc>,
    pub doors: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub curfew: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_override: bool,
    /// Set for overrides: the exception record that produced this occurrence.
    #[serde(default)]
    pub source_exception: Option<ExceptionKey>,
}

/// The times a shift layout is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentContext {
    pub starts_at: DateTime<Utc>,
    pub doors_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub curfew_at: Option<DateTime<Utc>>,
}

impl Occurrence {
    pub fn segment_context(&self) -> SegmentContext {
        SegmentContext {
            starts_at: self.start,
            doors_at: self.doors,
            ends_at: self.end,
            curfew_at: self.curfew,
        }
    }

    /// Doors if set, otherwise the start.
    pub fn doors_or_start(&self) -> DateTime<Utc> {
        self.doors.unwrap_or(self.start)
    }
}
