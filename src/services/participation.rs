//! Event participation service
//!
//! Owns the per-(event, user) participation state machine:
//! join -> PENDING or CONFIRMED, PENDING -> CONFIRMED/DECLINED via
//! organizer/admin action, leave removes the row. Attendance marking is
//! idempotent and feeds the scoring engine exactly once per participant.

use chrono::Utc;
use tracing::{debug, info};

use crate::database::repositories::{EventRepository, ParticipantRepository};
use crate::models::event::{Event, EventParticipant, ParticipationStatus};
use crate::services::gamification::GamificationService;
use crate::utils::errors::{LetzError, Result};
use crate::utils::logging::{log_event_action, log_participation_change};

/// Event participation service
#[derive(Clone)]
pub struct ParticipationService {
    event_repository: EventRepository,
    participant_repository: ParticipantRepository,
    gamification_service: GamificationService,
}

impl ParticipationService {
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

    /// Join an event
    ///
    /// The initial status follows the event's approval policy: PENDING when
    /// approval is required, CONFIRMED otherwise. Capacity is re-validated
    /// under a row lock so concurrent joins cannot overshoot the limit.
    pub async fn join(&self, event_id: i64, user_id: i64) -> Result<EventParticipant> {
        let event = self.require_event(event_id).await?;

        // the organizer's membership is implicit, never a participant row
        if event.organizer_id == user_id {
            return Err(LetzError::AlreadyParticipating { event_id, user_id });
        }

        if self.participant_repository.exists(event_id, user_id).await? {
            return Err(LetzError::AlreadyParticipating { event_id, user_id });
        }

        let status = if event.requires_approval {
            ParticipationStatus::Pending
        } else {
            ParticipationStatus::Confirmed
        };

        let participant = self
            .participant_repository
            .register_guarded(event_id, user_id, status, Utc::now())
            .await?;

        info!(
            event_id = event_id,
            user_id = user_id,
            status = %status,
            "User joined event"
        );
        Ok(participant)
    }

    /// Leave an event; the user becomes eligible to join again
    pub async fn leave(&self, event_id: i64, user_id: i64) -> Result<()> {
        let removed = self.participant_repository.delete(event_id, user_id).await?;
        if !removed {
            return Err(LetzError::NotParticipating { event_id, user_id });
        }

        info!(event_id = event_id, user_id = user_id, "User left event");
        Ok(())
    }

    /// Approve a pending participant (organizer/admin only)
    ///
    /// Capacity is re-validated under the event row lock: every door into
    /// CONFIRMED counts against the participant limit, not just the join.
    pub async fn approve(&self, event_id: i64, user_id: i64, acting_user_id: i64) -> Result<EventParticipant> {
        self.transition_pending(event_id, user_id, acting_user_id, ParticipationStatus::Confirmed)
            .await
    }

    /// Decline a pending participant (organizer/admin only)
    pub async fn decline(&self, event_id: i64, user_id: i64, acting_user_id: i64) -> Result<EventParticipant> {
        self.transition_pending(event_id, user_id, acting_user_id, ParticipationStatus::Declined)
            .await
    }

    async fn transition_pending(
        &self,
        event_id: i64,
        user_id: i64,
        acting_user_id: i64,
        target: ParticipationStatus,
    ) -> Result<EventParticipant> {
        let event = self.require_event(event_id).await?;
        self.ensure_can_manage(&event, acting_user_id).await?;

        let participant = self
            .participant_repository
            .find_by_event_and_user(event_id, user_id)
            .await?
            .ok_or(LetzError::NotParticipating { event_id, user_id })?;

        let current = participant.participation_status();
        if current != ParticipationStatus::Pending {
            return Err(LetzError::InvalidStateTransition {
                from: current.to_string(),
                to: target.to_string(),
            });
        }

        let updated = match target {
            ParticipationStatus::Confirmed => {
                self.participant_repository
                    .confirm_guarded(event_id, user_id, Utc::now())
                    .await?
            }
            _ => {
                self.participant_repository
                    .update_status(event_id, user_id, target, Utc::now())
                    .await?
            }
        };

        log_participation_change(event_id, user_id, current.as_str(), target.as_str());
        Ok(updated)
    }

    /// Mark a confirmed participant as attended (organizer/admin only)
    ///
    /// Idempotent: repeated calls are no-ops. The attendee is scored
    /// exactly once, on the first transition.
    pub async fn mark_attended(&self, event_id: i64, user_id: i64, acting_user_id: i64) -> Result<()> {
        let event = self.require_event(event_id).await?;
        self.ensure_can_manage(&event, acting_user_id).await?;

        let participant = self
            .participant_repository
            .find_by_event_and_user(event_id, user_id)
            .await?
            .ok_or(LetzError::NotParticipating { event_id, user_id })?;

        let status = participant.participation_status();
        if status != ParticipationStatus::Confirmed {
            return Err(LetzError::InvalidStateTransition {
                from: status.to_string(),
                to: "ATTENDED".to_string(),
            });
        }

        let first_transition = self
            .participant_repository
            .mark_attended_once(event_id, user_id, Utc::now())
            .await?;

        if first_transition {
            log_event_action(event_id, "mark_attended", acting_user_id, Some(user_id));
            self.gamification_service.on_event_attended(user_id).await?;
        } else {
            debug!(event_id = event_id, user_id = user_id, "Attendance already recorded");
        }

        Ok(())
    }

    /// Count of CONFIRMED participants, recomputed on demand
    pub async fn total_confirmed_participants(&self, event_id: i64) -> Result<i64> {
        self.participant_repository.count_confirmed(event_id).await
    }

    /// Whether the event's participant limit has been reached
    pub async fn has_reached_capacity(&self, event_id: i64) -> Result<bool> {
        let event = self.require_event(event_id).await?;
        match event.max_participants {
            Some(max) => {
                let confirmed = self.participant_repository.count_confirmed(event_id).await?;
                Ok(confirmed >= i64::from(max))
            }
            None => Ok(false),
        }
    }

    /// List participants of an event
    pub async fn list_participants(&self, event_id: i64) -> Result<Vec<EventParticipant>> {
        self.require_event(event_id).await?;
        self.participant_repository.list_by_event(event_id).await
    }

    /// Designate an event admin (organizer only)
    pub async fn add_event_admin(&self, event_id: i64, user_id: i64, acting_user_id: i64) -> Result<()> {
        let event = self.require_event(event_id).await?;
        if event.organizer_id != acting_user_id {
            return Err(LetzError::PermissionDenied(format!(
                "only the organizer can manage admins of event {}",
                event_id
            )));
        }

        self.event_repository.add_admin(event_id, user_id, acting_user_id).await?;
        log_event_action(event_id, "add_admin", acting_user_id, Some(user_id));
        Ok(())
    }

    /// Remove an event admin (organizer only)
    pub async fn remove_event_admin(&self, event_id: i64, user_id: i64, acting_user_id: i64) -> Result<()> {
        let event = self.require_event(event_id).await?;
        if event.organizer_id != acting_user_id {
            return Err(LetzError::PermissionDenied(format!(
                "only the organizer can manage admins of event {}",
                event_id
            )));
        }

        self.event_repository.remove_admin(event_id, user_id).await?;
        log_event_action(event_id, "remove_admin", acting_user_id, Some(user_id));
        Ok(())
    }

    async fn require_event(&self, event_id: i64) -> Result<Event> {
        self.event_repository
            .find_by_id(event_id)
            .await?
            .ok_or(LetzError::EventNotFound { event_id })
    }

    async fn ensure_can_manage(&self, event: &Event, acting_user_id: i64) -> Result<()> {
        if event.organizer_id == acting_user_id {
            return Ok(());
        }
        if self.event_repository.is_admin(event.id, acting_user_id).await? {
            return Ok(());
        }
        Err(LetzError::PermissionDenied(format!(
            "user {} cannot manage participants of event {}",
            acting_user_id, event.id
        )))
    }
}
