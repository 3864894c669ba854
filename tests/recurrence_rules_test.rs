//! Recurrence rule and event lifecycle tests that run without a database

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use letz_engine::models::{EventStatus, RecurrenceType, RecurringEvent};

fn rule(recurrence_type: RecurrenceType, interval: i32, start: DateTime<Utc>) -> RecurringEvent {
    RecurringEvent {
        id: 1,
        template_event_id: 10,
        recurrence_type: recurrence_type.to_string(),
        recurrence_interval: interval,
        days_of_week: None,
        day_of_month: None,
        week_of_month: None,
        start_date: start,
        end_date: None,
        max_occurrences: None,
        current_occurrences: 0,
        is_active: true,
        created_at: start,
        updated_at: start,
    }
}

#[test]
fn weekly_rule_walks_week_by_week() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap();
    let weekly = rule(RecurrenceType::Weekly, 1, start);

    let first = weekly.next_occurrence(None).unwrap();
    assert_eq!(first, Utc.with_ymd_and_hms(2024, 1, 8, 19, 0, 0).unwrap());

    let second = weekly.next_occurrence(Some(first)).unwrap();
    assert_eq!(second, Utc.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).unwrap());
}

#[test]
fn biweekly_rule_honors_the_interval() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap();
    let biweekly = rule(RecurrenceType::Weekly, 2, start);

    let first = biweekly.next_occurrence(None).unwrap();
    assert_eq!(first, Utc.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).unwrap());
}

#[test]
fn monthly_rule_clamps_to_short_months() {
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
    let mut monthly = rule(RecurrenceType::Monthly, 1, start);
    monthly.day_of_month = Some(31);

    let february = monthly.next_occurrence(None).unwrap();
    assert_eq!(february, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());

    let march = monthly.next_occurrence(Some(february)).unwrap();
    assert_eq!(march, Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap());
}

#[test]
fn occurrence_cap_stops_generation() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap();
    let now = start + Duration::days(30);

    let mut capped = rule(RecurrenceType::Daily, 1, start);
    capped.max_occurrences = Some(3);

    capped.current_occurrences = 2;
    assert!(capped.can_generate_more(now));

    capped.current_occurrences = 3;
    assert!(!capped.can_generate_more(now));
}

#[test]
fn end_date_stops_generation() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap();
    let mut bounded = rule(RecurrenceType::Daily, 1, start);
    bounded.end_date = Some(start + Duration::days(10));

    assert!(bounded.can_generate_more(start + Duration::days(10)));
    assert!(!bounded.can_generate_more(start + Duration::days(11)));
}

#[test]
fn event_status_transitions_are_monotonic() {
    assert!(EventStatus::Planned.can_transition_to(EventStatus::Active));
    assert!(EventStatus::Planned.can_transition_to(EventStatus::Finished));
    assert!(EventStatus::Planned.can_transition_to(EventStatus::Cancelled));
    assert!(EventStatus::Active.can_transition_to(EventStatus::Finished));
    assert!(EventStatus::Active.can_transition_to(EventStatus::Cancelled));

    assert!(!EventStatus::Active.can_transition_to(EventStatus::Planned));
    assert!(!EventStatus::Finished.can_transition_to(EventStatus::Active));
    assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Planned));
    assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Finished));
}

proptest! {
    #[test]
    fn next_occurrence_is_always_after_its_base(
        day_offset in 0i64..3650,
        interval in 1i32..52,
        type_index in 0usize..4,
    ) {
        let types = [
            RecurrenceType::Daily,
            RecurrenceType::Weekly,
            RecurrenceType::Monthly,
            RecurrenceType::Yearly,
        ];
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 18, 0, 0).unwrap() + Duration::days(day_offset);
        let recurring = rule(types[type_index], interval, start);

        let next = recurring.next_occurrence(None).unwrap();
        prop_assert!(next > start);
    }
}
