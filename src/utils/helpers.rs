//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the engine.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

/// Generate a unique invite code for an event
pub fn generate_invite_code() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Last day of the month containing the given date
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // first day of the next month minus one day
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Override the day-of-month of a timestamp, clamping to the month's last day
pub fn with_day_clamped(timestamp: DateTime<Utc>, day: u32) -> DateTime<Utc> {
    let clamped = day.min(last_day_of_month(timestamp.year(), timestamp.month())).max(1);
    timestamp.with_day(clamped).unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_invite_code_is_unique() {
        let a = generate_invite_code();
        let b = generate_invite_code();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 1), 31);
        assert_eq!(last_day_of_month(2024, 2), 29); // leap year
        assert_eq!(last_day_of_month(2023, 2), 28);
        assert_eq!(last_day_of_month(2024, 12), 31);
    }

    #[test]
    fn test_with_day_clamped() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 10, 18, 0, 0).unwrap();
        assert_eq!(with_day_clamped(ts, 31).day(), 29);
        assert_eq!(with_day_clamped(ts, 15).day(), 15);
    }
}
