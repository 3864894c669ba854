//! Event management service
//!
//! Handles event CRUD and lifecycle status. The organizer is fixed at
//! creation, as is the invite code; both are immutable afterwards.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::database::repositories::{EventRepository, ParticipantRepository};
use crate::models::event::{CreateEventRequest, Event, EventStatus, UpdateEventRequest};
use crate::services::gamification::GamificationService;
use crate::utils::errors::{LetzError, Result};
use crate::utils::helpers::generate_invite_code;

/// Event management service
#[derive(Clone)]
pub struct EventService {
    event_repository: EventRepository,
    participant_repository: ParticipantRepository,
    gamification_service: GamificationService,
}

impl EventService {
    pub fn new(
        event_repository: EventRepository,
        participant_repository: ParticipantRepository,
        gamification_service: GamificationService,
    ) -> Self {
        Self {
            event_repository,
            participant_repository,
            gamification_service,
        }
    }

    /// Create a new event and score it for the organizer
    pub async fn create_event(&self, organizer_id: i64, request: CreateEventRequest) -> Result<Event> {
        validate_event_fields(
            &request.title,
            &request.location,
            request.start_date_time,
            request.end_date_time,
            request.max_participants,
        )?;

        let invite_code = generate_invite_code();
        let event = self
            .event_repository
            .create(organizer_id, &invite_code, &request)
            .await?;

        info!(event_id = event.id, organizer_id = organizer_id, "Event created");
        self.gamification_service.on_event_created(organizer_id).await?;

        Ok(event)
    }

    /// Get an event, enforcing visibility
    ///
    /// Private events are visible to the organizer and participants only.
    pub async fn get_event(&self, event_id: i64, user_id: i64) -> Result<Event> {
        let event = self.require_event(event_id).await?;

        if event.is_private
            && event.organizer_id != user_id
            && !self.participant_repository.exists(event_id, user_id).await?
        {
            return Err(LetzError::PermissionDenied(format!(
                "user {} has no access to event {}",
                user_id, event_id
            )));
        }

        Ok(event)
    }

    /// Resolve an event from its invite code
    ///
    /// The invite code grants read access regardless of privacy.
    pub async fn get_event_by_invite_code(&self, invite_code: &str) -> Result<Event> {
        self.event_repository
            .find_by_invite_code(invite_code)
            .await?
            .ok_or_else(|| LetzError::InvalidInput("unknown invite code".to_string()))
    }

    /// Update event fields (organizer only)
    pub async fn update_event(
        &self,
        event_id: i64,
        acting_user_id: i64,
        request: UpdateEventRequest,
    ) -> Result<Event> {
        let event = self.require_event(event_id).await?;
        self.ensure_organizer(&event, acting_user_id)?;
        validate_update(&event, &request)?;

        let updated = self.event_repository.update(event_id, &request).await?;
        debug!(event_id = event_id, "Event updated");
        Ok(updated)
    }

    /// Transition the event status (organizer only)
    ///
    /// Transitions are monotonic; CANCELLED is terminal from any state.
    pub async fn set_event_status(
        &self,
        event_id: i64,
        acting_user_id: i64,
        target: EventStatus,
    ) -> Result<Event> {
        let event = self.require_event(event_id).await?;
        self.ensure_organizer(&event, acting_user_id)?;

        let current = event.event_status();
        if !current.can_transition_to(target) {
            return Err(LetzError::InvalidStateTransition {
                from: current.to_string(),
                to: target.to_string(),
            });
        }

        let updated = self.event_repository.set_status(event_id, target).await?;
        info!(event_id = event_id, from = %current, to = %target, "Event status changed");
        Ok(updated)
    }

    /// Cancel an event (organizer only)
    pub async fn cancel_event(&self, event_id: i64, acting_user_id: i64) -> Result<Event> {
        self.set_event_status(event_id, acting_user_id, EventStatus::Cancelled).await
    }

    /// Delete an event (organizer only)
    pub async fn delete_event(&self, event_id: i64, acting_user_id: i64) -> Result<()> {
        let event = self.require_event(event_id).await?;
        self.ensure_organizer(&event, acting_user_id)?;

        self.event_repository.delete(event_id).await?;
        info!(event_id = event_id, "Event deleted");
        Ok(())
    }

    /// Events organized by the user, most recent first
    pub async fn get_my_events(&self, user_id: i64) -> Result<Vec<Event>> {
        self.event_repository.list_by_organizer(user_id).await
    }

    /// Events the user participates in
    pub async fn get_events_as_participant(&self, user_id: i64) -> Result<Vec<Event>> {
        self.event_repository.list_by_participant(user_id).await
    }

    /// The user's events within the next week
    pub async fn get_upcoming_events(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<Event>> {
        self.event_repository
            .list_upcoming_for_user(user_id, now, now + Duration::weeks(1))
            .await
    }

    async fn require_event(&self, event_id: i64) -> Result<Event> {
        self.event_repository
            .find_by_id(event_id)
            .await?
            .ok_or(LetzError::EventNotFound { event_id })
    }

    fn ensure_organizer(&self, event: &Event, acting_user_id: i64) -> Result<()> {
        if event.organizer_id != acting_user_id {
            return Err(LetzError::PermissionDenied(format!(
                "only the organizer can manage event {}",
                event.id
            )));
        }
        Ok(())
    }
}

/// Validate an update against the state the event would end up in
///
/// Partial updates are merged with the stored fields first; a new start
/// alone must still sit before the existing end.
fn validate_update(event: &Event, request: &UpdateEventRequest) -> Result<()> {
    let title = request.title.as_deref().unwrap_or(&event.title);
    let location = request.location.as_deref().unwrap_or(&event.location);
    let start = request.start_date_time.unwrap_or(event.start_date_time);
    let end = if request.clear_end_time {
        None
    } else {
        request.end_date_time.or(event.end_date_time)
    };
    let max_participants = request.max_participants.or(event.max_participants);

    validate_event_fields(title, location, start, end, max_participants)
}

fn validate_event_fields(
    title: &str,
    location: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    max_participants: Option<i32>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(LetzError::InvalidInput("title cannot be empty".to_string()));
    }
    if location.trim().is_empty() {
        return Err(LetzError::InvalidInput("location cannot be empty".to_string()));
    }
    if let Some(end) = end {
        if end <= start {
            return Err(LetzError::InvalidInput(
                "end time must be after start time".to_string(),
            ));
        }
    }
    if let Some(max) = max_participants {
        if max <= 0 {
            return Err(LetzError::InvalidInput(
                "max_participants must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored_event(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Event {
        Event {
            id: 1,
            title: "Dinner".to_string(),
            description: None,
            event_type: "DINNER".to_string(),
            start_date_time: start,
            end_date_time: end,
            location: "Home".to_string(),
            address: None,
            latitude: None,
            longitude: None,
            organizer_id: 7,
            max_participants: Some(8),
            is_private: false,
            requires_approval: false,
            invite_code: "code".to_string(),
            status: EventStatus::Planned.to_string(),
            recurring_event_id: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_validate_event_fields() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();

        assert!(validate_event_fields("Dinner", "Home", start, Some(end), Some(8)).is_ok());
        assert!(validate_event_fields("", "Home", start, None, None).is_err());
        assert!(validate_event_fields("Dinner", "  ", start, None, None).is_err());
        assert!(validate_event_fields("Dinner", "Home", end, Some(start), None).is_err());
        assert!(validate_event_fields("Dinner", "Home", start, None, Some(0)).is_err());
    }

    #[test]
    fn test_partial_update_is_validated_against_stored_fields() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();
        let event = stored_event(start, Some(end));

        // moving only the start past the stored end must fail
        let past_end = UpdateEventRequest {
            start_date_time: Some(end + Duration::hours(1)),
            ..Default::default()
        };
        assert!(validate_update(&event, &past_end).is_err());

        // the same move is fine once the end is cleared with it
        let past_end_open_ended = UpdateEventRequest {
            start_date_time: Some(end + Duration::hours(1)),
            clear_end_time: true,
            ..Default::default()
        };
        assert!(validate_update(&event, &past_end_open_ended).is_ok());

        let empty_title = UpdateEventRequest {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&event, &empty_title).is_err());

        let bad_capacity = UpdateEventRequest {
            max_participants: Some(0),
            ..Default::default()
        };
        assert!(validate_update(&event, &bad_capacity).is_err());

        // untouched fields keep the stored, valid values
        assert!(validate_update(&event, &UpdateEventRequest::default()).is_ok());
    }
}
