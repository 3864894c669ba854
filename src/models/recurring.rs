//! Recurring event model and recurrence rule math

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::utils::helpers::with_day_clamped;

/// Recurrence definition that spawns event occurrences from a template event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringEvent {
    pub id: i64,
    pub template_event_id: i64,
    pub recurrence_type: String,
    pub recurrence_interval: i32,
    /// ISO weekday numbers (1 = Monday .. 7 = Sunday), weekly refinement
    pub days_of_week: Option<Vec<i16>>,
    pub day_of_month: Option<i32>,
    pub week_of_month: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_occurrences: Option<i32>,
    pub current_occurrences: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringEvent {
    /// Parsed recurrence type, defaulting to CUSTOM for unknown values
    pub fn recurrence_type(&self) -> RecurrenceType {
        RecurrenceType::from_str(&self.recurrence_type).unwrap_or(RecurrenceType::Custom)
    }

    /// Whether another occurrence may be generated
    pub fn can_generate_more(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(end) = self.end_date {
            if now > end {
                return false;
            }
        }
        if let Some(max) = self.max_occurrences {
            if self.current_occurrences >= max {
                return false;
            }
        }
        true
    }

    /// Start time of the next occurrence
    ///
    /// The base is the start of the most recently generated occurrence, or
    /// `start_date` when nothing has been generated yet. Returns `None` on
    /// date arithmetic overflow.
    pub fn next_occurrence(&self, last_generated_start: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        self.next_occurrence_after(last_generated_start.unwrap_or(self.start_date))
    }

    /// Apply the recurrence rule once, starting from `base`
    pub fn next_occurrence_after(&self, base: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let interval = i64::from(self.recurrence_interval);
        match self.recurrence_type() {
            RecurrenceType::Daily | RecurrenceType::Custom => {
                base.checked_add_signed(Duration::days(interval))
            }
            RecurrenceType::Weekly => {
                let mut next = base.checked_add_signed(Duration::weeks(interval))?;
                if let Some(days) = self.days_of_week.as_ref().filter(|d| !d.is_empty()) {
                    // advance to the next matching weekday instead of a flat
                    // week offset
                    for _ in 0..7 {
                        let weekday = next.weekday().number_from_monday() as i16;
                        if days.contains(&weekday) {
                            break;
                        }
                        next = next.checked_add_signed(Duration::days(1))?;
                    }
                }
                Some(next)
            }
            RecurrenceType::Monthly => {
                let shifted = base.checked_add_months(Months::new(self.recurrence_interval as u32))?;
                match self.day_of_month {
                    Some(day) if day >= 1 => Some(with_day_clamped(shifted, day as u32)),
                    _ => Some(shifted),
                }
            }
            RecurrenceType::Yearly => {
                base.checked_add_months(Months::new(self.recurrence_interval as u32 * 12))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecurringEventRequest {
    pub template_event_id: i64,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: i32,
    pub days_of_week: Option<Vec<i16>>,
    pub day_of_month: Option<i32>,
    pub week_of_month: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_occurrences: Option<i32>,
}

/// Recurrence period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecurrenceType::Daily => "DAILY",
            RecurrenceType::Weekly => "WEEKLY",
            RecurrenceType::Monthly => "MONTHLY",
            RecurrenceType::Yearly => "YEARLY",
            RecurrenceType::Custom => "CUSTOM",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(RecurrenceType::Daily),
            "WEEKLY" => Ok(RecurrenceType::Weekly),
            "MONTHLY" => Ok(RecurrenceType::Monthly),
            "YEARLY" => Ok(RecurrenceType::Yearly),
            "CUSTOM" => Ok(RecurrenceType::Custom),
            other => Err(format!("unknown recurrence type: {}", other)),
        }
    }
}
