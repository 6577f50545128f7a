//! Scheduler settings: organization time zone and series bounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::error::{Result, ScheduleError};
use crate::zone::Zone;

pub const DEFAULT_MAX_OCCURRENCES: usize = 64;
pub const DEFAULT_HORIZON_MONTHS: u32 = 6;
pub const DEFAULT_ATTEMPTS_PER_OCCURRENCE: usize = 6;
const MAX_HORIZON_MONTHS: u32 = 12 * 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// IANA name of the organization time zone.
    pub timezone: String,
    /// Series length used by refreshes and listing views.
    pub max_occurrences: usize,
    /// Default horizon in calendar months after now.
    pub horizon_months: u32,
    /// Stepping attempts allowed per requested occurrence before giving up.
    pub attempts_per_occurrence: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            horizon_months: DEFAULT_HORIZON_MONTHS,
            attempts_per_occurrence: DEFAULT_ATTEMPTS_PER_OCCURRENCE,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidConfig` on malformed JSON or values out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ScheduleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `ScheduleError::InvalidConfig` when a bound is zero, or
    /// `ScheduleError::InvalidTimezone` for an unknown zone.
    pub fn validate(&self) -> Result<()> {
        if self.attempts_per_occurrence == 0 {
            return Err(ScheduleError::InvalidConfig(
                "attempts_per_occurrence must be at least 1".to_string(),
            ));
        }
        if self.max_occurrences == 0 {
            return Err(ScheduleError::InvalidConfig(
                "max_occurrences must be at least 1".to_string(),
            ));
        }
        self.zone().map(|_| ())
    }

    /// # Errors
    /// Returns `ScheduleError::InvalidTimezone` for an unknown zone name.
    pub fn zone(&self) -> Result<Zone> {
        Zone::parse(&self.timezone)
    }

    /// `now` plus `horizon_months`, computed on local wall time.
    pub fn default_horizon(&self, zone: &Zone, now: DateTime<Utc>) -> DateTime<Utc> {
        let months = self.horizon_months.min(MAX_HORIZON_MONTHS) as i32;
        zone.localize(add_months(zone.to_local(now), months))
    }
}
