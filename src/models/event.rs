//! Event and participation models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub location: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organizer_id: i64,
    pub max_participants: Option<i32>,
    pub is_private: bool,
    pub requires_approval: bool,
    pub invite_code: String,
    pub status: String,
    pub recurring_event_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// True iff the event has not started yet
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date_time > now
    }

    /// True iff the event has started and has not ended
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        now > self.start_date_time
            && self.end_date_time.map_or(true, |end| now < end)
    }

    /// True iff the event has an end time and it has passed
    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.end_date_time.map_or(false, |end| now > end)
    }

    /// Parsed event status
    pub fn event_status(&self) -> EventStatus {
        EventStatus::from_str(&self.status).unwrap_or(EventStatus::Planned)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventParticipant {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: String,
    pub has_attended: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventParticipant {
    /// Parsed participation status
    pub fn participation_status(&self) -> ParticipationStatus {
        ParticipationStatus::from_str(&self.status).unwrap_or(ParticipationStatus::Pending)
    }
}

/// Designated event administrator, added by the organizer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventAdmin {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub location: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_participants: Option<i32>,
    pub is_private: bool,
    pub requires_approval: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    /// Remove the end time, making the event open-ended
    ///
    /// A `None` in `end_date_time` means "leave unchanged", so clearing
    /// needs its own flag.
    #[serde(default)]
    pub clear_end_time: bool,
    pub location: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_participants: Option<i32>,
    pub requires_approval: Option<bool>,
}

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Barbecue,
    BirthdayParty,
    Dinner,
    Lunch,
    HouseParty,
    HappyHour,
    Gathering,
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Barbecue => "BARBECUE",
            EventType::BirthdayParty => "BIRTHDAY_PARTY",
            EventType::Dinner => "DINNER",
            EventType::Lunch => "LUNCH",
            EventType::HouseParty => "HOUSE_PARTY",
            EventType::HappyHour => "HAPPY_HOUR",
            EventType::Gathering => "GATHERING",
            EventType::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BARBECUE" => Ok(EventType::Barbecue),
            "BIRTHDAY_PARTY" => Ok(EventType::BirthdayParty),
            "DINNER" => Ok(EventType::Dinner),
            "LUNCH" => Ok(EventType::Lunch),
            "HOUSE_PARTY" => Ok(EventType::HouseParty),
            "HAPPY_HOUR" => Ok(EventType::HappyHour),
            "GATHERING" => Ok(EventType::Gathering),
            "OTHER" => Ok(EventType::Other),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Event lifecycle status
///
/// Transitions are monotonic except CANCELLED, which is terminal from any
/// state. FINISHED is usually derived from the end time but may be set
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Planned,
    Active,
    Cancelled,
    Finished,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planned => "PLANNED",
            EventStatus::Active => "ACTIVE",
            EventStatus::Cancelled => "CANCELLED",
            EventStatus::Finished => "FINISHED",
        }
    }

    /// Whether a transition to the given status is allowed
    pub fn can_transition_to(&self, target: EventStatus) -> bool {
        if *self == target {
            return false;
        }
        match (self, target) {
            // terminal states
            (EventStatus::Cancelled, _) => false,
            (EventStatus::Finished, EventStatus::Cancelled) => true,
            (EventStatus::Finished, _) => false,
            // cancellation is allowed from any non-terminal state
            (_, EventStatus::Cancelled) => true,
            (EventStatus::Planned, EventStatus::Active) => true,
            (EventStatus::Planned, EventStatus::Finished) => true,
            (EventStatus::Active, EventStatus::Finished) => true,
            _ => false,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANNED" => Ok(EventStatus::Planned),
            "ACTIVE" => Ok(EventStatus::Active),
            "CANCELLED" => Ok(EventStatus::Cancelled),
            "FINISHED" => Ok(EventStatus::Finished),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// Per-user participation status within an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipationStatus {
    Pending,
    Confirmed,
    Declined,
    Cancelled,
}

impl ParticipationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Pending => "PENDING",
            ParticipationStatus::Confirmed => "CONFIRMED",
            ParticipationStatus::Declined => "DECLINED",
            ParticipationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParticipationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ParticipationStatus::Pending),
            "CONFIRMED" => Ok(ParticipationStatus::Confirmed),
            "DECLINED" => Ok(ParticipationStatus::Declined),
            "CANCELLED" => Ok(ParticipationStatus::Cancelled),
            other => Err(format!("unknown participation status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Event {
        Event {
            id: 1,
            title: "Barbecue at the lake".to_string(),
            description: None,
            event_type: EventType::Barbecue.to_string(),
            start_date_time: start,
            end_date_time: end,
            location: "Lakeside".to_string(),
            address: None,
            latitude: None,
            longitude: None,
            organizer_id: 7,
            max_participants: Some(10),
            is_private: true,
            requires_approval: false,
            invite_code: "code".to_string(),
            status: EventStatus::Planned.to_string(),
            recurring_event_id: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_lifecycle_queries() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();
        let event = sample_event(start, Some(end));

        let before = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(event.is_upcoming(before));
        assert!(!event.is_ongoing(before));
        assert!(!event.is_finished(before));

        let during = Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap();
        assert!(!event.is_upcoming(during));
        assert!(event.is_ongoing(during));
        assert!(!event.is_finished(during));

        let after = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        assert!(!event.is_upcoming(after));
        assert!(!event.is_ongoing(after));
        assert!(event.is_finished(after));
    }

    #[test]
    fn test_open_ended_event_never_finishes() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let event = sample_event(start, None);

        let much_later = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        assert!(event.is_ongoing(much_later));
        assert!(!event.is_finished(much_later));
    }

    #[test]
    fn test_status_transitions() {
        assert!(EventStatus::Planned.can_transition_to(EventStatus::Active));
        assert!(EventStatus::Planned.can_transition_to(EventStatus::Cancelled));
        assert!(EventStatus::Active.can_transition_to(EventStatus::Finished));
        assert!(EventStatus::Finished.can_transition_to(EventStatus::Cancelled));
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Planned));
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Active));
        assert!(!EventStatus::Active.can_transition_to(EventStatus::Planned));
        assert!(!EventStatus::Finished.can_transition_to(EventStatus::Active));
    }

    #[test]
    fn test_status_round_trip() {
        for status in ["PENDING", "CONFIRMED", "DECLINED", "CANCELLED"] {
            let parsed: ParticipationStatus = status.parse().unwrap();
            assert_eq!(parsed.as_str(), status);
        }
        assert!("REGISTERED".parse::<ParticipationStatus>().is_err());
    }
}
