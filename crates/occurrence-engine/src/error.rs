//! Error types for occurrence-engine boundary operations.
//!
//! The generator itself is total and never fails; these errors come from
//! parsing, validation, configuration, and the refresher's persisted write.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid manual occurrence '{value}': {reason}")]
    InvalidManualDate { value: String, reason: String },

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
