//! Recurrence definitions and the next-candidate stepping rules.
//!
//! Five shapes are supported and nothing else: no repeat, weekly, every other
//! week, monthly on a day number, and monthly on the n-th weekday. Each shape
//! has its own stepping function, selected by an exhaustive match.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{clamped_date, next_month, nth_weekday_of_month};
use crate::zone::Zone;

/// How a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    #[default]
    None,
    Weekly,
    Biweekly,
    MonthlyByDate,
    MonthlyByWeekday,
}

impl RecurrenceFrequency {
    pub fn is_recurring(self) -> bool {
        self != RecurrenceFrequency::None
    }

    pub fn label(self) -> &'static str {
        match self {
            RecurrenceFrequency::None => "Does not repeat",
            RecurrenceFrequency::Weekly => "Weekly",
            RecurrenceFrequency::Biweekly => "Every other week",
            RecurrenceFrequency::MonthlyByDate => "Monthly (specific date)",
            RecurrenceFrequency::MonthlyByWeekday => "Monthly (weekday, e.g. 1st Thursday)",
        }
    }
}

/// Weekday index as stored on an event: 0 = Monday .. 6 = Sunday.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    Weekday::try_from(index).ok()
}

pub fn weekday_label(index: u8) -> Option<&'static str> {
    let label = match weekday_from_index(index)? {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    Some(label)
}

pub fn week_of_month_label(week: u8) -> Option<&'static str> {
    match week {
        1 => Some("First"),
        2 => Some("Second"),
        3 => Some("Third"),
        4 => Some("Fourth"),
        5 => Some("Fifth"),
        _ => None,
    }
}

/// The pattern fields carried on a recurring event.
///
/// Which parameters matter depends on `frequency`; the others are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecurrenceRule {
    #[serde(default)]
    pub frequency: RecurrenceFrequency,
    /// 0 = Monday .. 6 = Sunday.
    #[serde(default)]
    pub weekday: Option<u8>,
    /// 1..=5; a 5th that does not exist falls back to the last one.
    #[serde(default)]
    pub week_of_month: Option<u8>,
    /// 1..=31; clamped to the month length.
    #[serde(default)]
    pub day_of_month: Option<u8>,
}

impl RecurrenceRule {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn weekly(weekday: Option<u8>) -> Self {
        Self {
            frequency: RecurrenceFrequency::Weekly,
            weekday,
            ..Self::default()
        }
    }

    pub fn biweekly(weekday: Option<u8>) -> Self {
        Self {
            frequency: RecurrenceFrequency::Biweekly,
            weekday,
            ..Self::default()
        }
    }

    pub fn monthly_by_date(day_of_month: Option<u8>) -> Self {
        Self {
            frequency: RecurrenceFrequency::MonthlyByDate,
            day_of_month,
            ..Self::default()
        }
    }

    pub fn monthly_by_weekday(weekday: Option<u8>, week_of_month: Option<u8>) -> Self {
        Self {
            frequency: RecurrenceFrequency::MonthlyByWeekday,
            weekday,
            week_of_month,
            ..Self::default()
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.frequency.is_recurring()
    }

    fn target_weekday(&self) -> Option<Weekday> {
        self.weekday.and_then(weekday_from_index)
    }

    /// Compute the candidate start that follows `current`.
    ///
    /// Returns `None` for non-repeating rules. The date is stepped from the
    /// local date of `current` and the result is placed at `time_of_day` in
    /// `zone`, so a start shifted out of a daylight-saving gap does not carry
    /// its shifted time into later dates.
    pub fn next_after(
        &self,
        current: DateTime<Utc>,
        time_of_day: NaiveTime,
        zone: &Zone,
    ) -> Option<DateTime<Utc>> {
        let date = zone.to_local(current).date();
        let next_date = match self.frequency {
            RecurrenceFrequency::None => return None,
            RecurrenceFrequency::Weekly => self.step_weeks(date, 1),
            RecurrenceFrequency::Biweekly => self.step_weeks(date, 2),
            RecurrenceFrequency::MonthlyByDate => self.step_month_by_date(date)?,
            RecurrenceFrequency::MonthlyByWeekday => self.step_month_by_weekday(date)?,
        };
        Some(zone.localize(next_date.and_time(time_of_day)))
    }

    fn step_weeks(&self, date: NaiveDate, weeks: i64) -> NaiveDate {
        let stepped = date + Duration::weeks(weeks);
        match self.target_weekday() {
            Some(target) => {
                let delta = (7 + target.num_days_from_monday()
                    - stepped.weekday().num_days_from_monday())
                    % 7;
                stepped + Duration::days(i64::from(delta))
            }
            None => stepped,
        }
    }

    fn step_month_by_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        let day = match self.day_of_month {
            Some(day) if day > 0 => u32::from(day),
            _ => date.day(),
        };
        let (year, month) = next_month(date.year(), date.month());
        clamped_date(year, month, day)
    }

    fn step_month_by_weekday(&self, date: NaiveDate) -> Option<NaiveDate> {
        let weekday = self.target_weekday().unwrap_or_else(|| date.weekday());
        let week = match self.week_of_month {
            Some(week) if week > 0 => u32::from(week),
            _ => 1,
        };
        let (year, month) = next_month(date.year(), date.month());
        let day = nth_weekday_of_month(year, month, weekday, week);
        clamped_date(year, month, day)
    }

    /// Human-readable summary, e.g. "Monthly on the first Thursday".
    pub fn description(&self) -> String {
        let weekday = self.weekday.and_then(weekday_label);
        match self.frequency {
            RecurrenceFrequency::None => "Does not repeat".to_string(),
            RecurrenceFrequency::Weekly => match weekday {
                Some(day) => format!("Weekly on {}", day),
                None => "Weekly".to_string(),
            },
            RecurrenceFrequency::Biweekly => match weekday {
                Some(day) => format!("Every other week on {}", day),
                None => "Every other week".to_string(),
            },
            RecurrenceFrequency::MonthlyByDate => match self.day_of_month {
                Some(day) if day > 0 => format!("Monthly on day {}", day),
                _ => "Monthly".to_string(),
            },
            RecurrenceFrequency::MonthlyByWeekday => {
                let week = self.week_of_month.and_then(week_of_month_label);
                match (week, weekday) {
                    (Some(week), Some(day)) => {
                        format!("Monthly on the {} {}", week.to_lowercase(), day)
                    }
                    (Some(week), None) => format!("Monthly on the {} week", week.to_lowercase()),
                    (None, Some(day)) => format!("Monthly on {}", day),
                    (None, None) => "Monthly".to_string(),
                }
            }
        }
    }
}
