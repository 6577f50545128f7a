//! The recurring event entity and the fields the engine reads from it.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::recurrence::RecurrenceRule;
use crate::zone::Zone;

/// Maximum length of an event slug.
pub const SLUG_MAX_LEN: usize = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Audience classification; holiday windows filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Public,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
    Archived,
    Cancelled,
}

/// A performer slot on an event. Copied by value onto override events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Performer {
    #[serde(default)]
    pub band_id: Option<Uuid>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub performer_type: String,
    #[serde(default)]
    pub slot_starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slot_ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub notes: String,
}

/// Doors/end/curfew expressed relative to the start of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleOffsets {
    pub doors: Option<Duration>,
    pub end: Option<Duration>,
    pub curfew: Option<Duration>,
}

impl ScheduleOffsets {
    /// Offsets of `doors`/`end`/`curfew` against `reference`.
    pub fn between(
        reference: Option<DateTime<Utc>>,
        doors: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        curfew: Option<DateTime<Utc>>,
    ) -> Self {
        let offset = |value: Option<DateTime<Utc>>| Some(value? - reference?);
        Self {
            doors: offset(doors),
            end: offset(end),
            curfew: offset(curfew),
        }
    }

    pub fn doors_at(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.doors.map(|offset| start + offset)
    }

    pub fn end_at(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.end.map(|offset| start + offset)
    }

    pub fn curfew_at(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.curfew.map(|offset| start + offset)
    }
}

/// A public- or internal-facing happening at the venue.
///
/// An event either repeats by `recurrence`, lists explicit `manual_occurrences`,
/// or happens once. Override events materialize one occurrence of a parent
/// series and point back at it through `parent_series`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub teaser: String,
    #[serde(default)]
    pub description_public: String,
    #[serde(default)]
    pub description_internal: String,

    #[serde(default)]
    pub doors_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub curfew_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub recurrence: RecurrenceRule,
    /// Cached start of the next upcoming occurrence, written by the refresher.
    #[serde(default)]
    pub next_start: Option<DateTime<Utc>>,
    /// ISO timestamps; only allowed when `recurrence.frequency` is `none`.
    #[serde(default)]
    pub manual_occurrences: Vec<String>,

    #[serde(default)]
    pub parent_series: Option<EventId>,
    #[serde(default)]
    pub parent_occurrence_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub standard_shifts: Vec<Uuid>,
    #[serde(default)]
    pub performers: Vec<Performer>,
    #[serde(default)]
    pub requires_shifts: bool,
}

impl Event {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: EventId::new(),
            slug: slugify(&title),
            title,
            status: EventStatus::default(),
            event_type: EventType::default(),
            teaser: String::new(),
            description_public: String::new(),
            description_internal: String::new(),
            doors_at: None,
            starts_at: None,
            ends_at: None,
            curfew_at: None,
            recurrence: RecurrenceRule::none(),
            next_start: None,
            manual_occurrences: Vec::new(),
            parent_series: None,
            parent_occurrence_start: None,
            categories: Vec::new(),
            standard_shifts: Vec::new(),
            performers: Vec::new(),
            requires_shifts: false,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    pub fn is_override(&self) -> bool {
        self.parent_series.is_some()
    }

    pub fn has_manual_occurrences(&self) -> bool {
        !self.manual_occurrences.is_empty()
    }

    /// Start the generator walks from: the cached `next_start` for a
    /// recurring series that has advanced, otherwise `starts_at`.
    pub fn anchor_start(&self) -> Option<DateTime<Utc>> {
        if self.is_recurring() {
            self.next_start.or(self.starts_at)
        } else {
            self.starts_at
        }
    }

    /// Doors/end/curfew relative to `starts_at` (or `next_start` when no start is set).
    pub fn offsets(&self) -> ScheduleOffsets {
        ScheduleOffsets::between(
            self.starts_at.or(self.next_start),
            self.doors_at,
            self.ends_at,
            self.curfew_at,
        )
    }

    pub fn recurrence_description(&self) -> String {
        if !self.is_recurring() && self.has_manual_occurrences() {
            return "Multiple dates".to_string();
        }
        self.recurrence.description()
    }

    /// Parsed manual dates in ascending order. Entries that do not parse are dropped.
    pub fn manual_occurrence_datetimes(&self, zone: &Zone) -> Vec<DateTime<Utc>> {
        let mut parsed: Vec<DateTime<Utc>> = self
            .manual_occurrences
            .iter()
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .filter_map(|raw| match parse_manual_occurrence(raw, zone) {
                Ok(dt) => Some(dt),
                Err(err) => {
                    tracing::warn!(event_id = %self.id, error = %err, "Dropping manual occurrence");
                    None
                }
            })
            .collect();
        parsed.sort();
        parsed
    }

    /// Check the invariants an edit boundary must enforce before handing the
    /// event to the scheduler.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRecurrence` for inconsistent recurrence
    /// fields and `ScheduleError::InvalidManualDate` for unparsable manual dates.
    pub fn validate(&self, zone: &Zone) -> Result<()> {
        let rule = &self.recurrence;
        if self.has_manual_occurrences() && rule.is_recurring() {
            return Err(ScheduleError::InvalidRecurrence(
                "manual occurrences require frequency 'none'".to_string(),
            ));
        }
        if rule.is_recurring() && self.starts_at.is_none() && self.next_start.is_none() {
            return Err(ScheduleError::InvalidRecurrence(
                "a recurring event needs a start time".to_string(),
            ));
        }
        if self.is_override() && rule.is_recurring() {
            return Err(ScheduleError::InvalidRecurrence(
                "an override event cannot repeat".to_string(),
            ));
        }
        if rule.weekday.is_some_and(|day| day > 6) {
            return Err(ScheduleError::InvalidRecurrence(
                "weekday must be between 0 (Monday) and 6 (Sunday)".to_string(),
            ));
        }
        if rule.week_of_month.is_some_and(|week| !(1..=5).contains(&week)) {
            return Err(ScheduleError::InvalidRecurrence(
                "week of month must be between 1 and 5".to_string(),
            ));
        }
        if rule.day_of_month.is_some_and(|day| !(1..=31).contains(&day)) {
            return Err(ScheduleError::InvalidRecurrence(
                "day of month must be between 1 and 31".to_string(),
            ));
        }
        for raw in &self.manual_occurrences {
            parse_manual_occurrence(raw, zone)?;
        }
        Ok(())
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse one manual occurrence string.
///
/// RFC 3339 values keep their offset; naive values are local time in `zone`.
///
/// # Errors
/// Returns `ScheduleError::InvalidManualDate` when no supported format matches.
pub fn parse_manual_occurrence(raw: &str, zone: &Zone) -> Result<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| zone.localize(naive))
        .ok_or_else(|| ScheduleError::InvalidManualDate {
            value: raw.to_string(),
            reason: "expected an ISO 8601 datetime".to_string(),
        })
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    trimmed.chars().take(SLUG_MAX_LEN).collect()
}
