//! # occurrence-engine
//!
//! Deterministic occurrence generation for recurring venue events.
//!
//! Turns a recurrence definition ("weekly on Thursdays", "monthly on the
//! fifth Monday", an explicit list of dates) into concrete occurrences, while
//! honoring per-date exceptions (skip or override a single date) and
//! organization-wide holiday windows. All calendar decisions are made in the
//! organization's time zone, injected together with the clock.
//!
//! ## Modules
//!
//! - [`recurrence`]: frequency shapes, stepping rules, descriptions
//! - [`event`]: the recurring event entity, offsets, manual dates
//! - [`exception`]: per-date skip/override records and their resolution
//! - [`holiday`]: blackout windows
//! - [`generator`]: the occurrence walk
//! - [`refresher`]: keeps the cached `next_start` pointer current
//! - [`cloner`]: materializes a single occurrence as an override event
//! - [`scheduler`]: entry points with zone, clock and settings injected
//! - [`calendar`]: month arithmetic helpers
//! - [`zone`]: time zone and clock
//! - [`config`]: scheduler settings
//! - [`error`]: error types

pub mod calendar;
pub mod cloner;
pub mod config;
pub mod error;
pub mod event;
pub mod exception;
pub mod generator;
pub mod holiday;
pub mod occurrence;
pub mod recurrence;
pub mod refresher;
pub mod scheduler;
pub mod zone;

pub use cloner::SlugRegistry;
pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use event::{Event, EventId, EventStatus, EventType, Performer, ScheduleOffsets};
pub use exception::{ExceptionKey, ExceptionKind, RecurrenceException};
pub use generator::{OccurrenceGenerator, SeriesOptions};
pub use holiday::HolidayWindow;
pub use occurrence::{Occurrence, SegmentContext};
pub use recurrence::{RecurrenceFrequency, RecurrenceRule};
pub use refresher::{InMemoryStore, NextStartStore, RefreshOutcome};
pub use scheduler::Scheduler;
pub use zone::{Clock, FixedClock, SystemClock, Zone};
