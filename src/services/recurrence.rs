//! Recurring event generation service
//!
//! Computes occurrence dates from recurrence definitions and clones the
//! template event into new occurrences. Generation is driven by an
//! external periodic trigger; the guarded occurrence counter makes a
//! re-run for the same period generate nothing.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::database::repositories::{EventRepository, RecurringEventRepository};
use crate::models::event::Event;
use crate::models::recurring::{CreateRecurringEventRequest, RecurringEvent};
use crate::utils::errors::{LetzError, Result};
use crate::utils::helpers::generate_invite_code;

/// Recurring event generation service
#[derive(Debug, Clone)]
pub struct RecurrenceService {
    recurring_repository: RecurringEventRepository,
    event_repository: EventRepository,
}

impl RecurrenceService {
    pub fn new(recurring_repository: RecurringEventRepository, event_repository: EventRepository) -> Self {
        Self {
            recurring_repository,
            event_repository,
        }
    }

    /// Create a recurrence definition for an existing template event
    pub async fn create_recurring_event(
        &self,
        request: CreateRecurringEventRequest,
    ) -> Result<RecurringEvent> {
        if request.recurrence_interval < 1 {
            return Err(LetzError::InvalidInput(
                "recurrence interval must be a positive number of periods".to_string(),
            ));
        }
        if let Some(days) = &request.days_of_week {
            if days.iter().any(|d| !(1..=7).contains(d)) {
                return Err(LetzError::InvalidInput(
                    "days_of_week must contain ISO weekday numbers 1-7".to_string(),
                ));
            }
        }
        if let Some(day) = request.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(LetzError::InvalidInput(
                    "day_of_month must be between 1 and 31".to_string(),
                ));
            }
        }
        if let Some(max) = request.max_occurrences {
            if max < 1 {
                return Err(LetzError::InvalidInput(
                    "max_occurrences must be positive".to_string(),
                ));
            }
        }

        let template_id = request.template_event_id;
        self.event_repository
            .find_by_id(template_id)
            .await?
            .ok_or(LetzError::EventNotFound { event_id: template_id })?;

        let recurring = self.recurring_repository.create(&request).await?;
        info!(
            recurring_event_id = recurring.id,
            template_event_id = template_id,
            recurrence_type = %recurring.recurrence_type,
            "Recurring event created"
        );
        Ok(recurring)
    }

    /// Generate the next occurrence, if the definition still allows one
    ///
    /// Returns None when generation has stopped (the definition is
    /// deactivated so the caller's loop ends permanently) or when a
    /// concurrent run already generated this period's occurrence.
    pub async fn generate(&self, recurring_event_id: i64, now: DateTime<Utc>) -> Result<Option<Event>> {
        let recurring = self
            .recurring_repository
            .find_by_id(recurring_event_id)
            .await?
            .ok_or(LetzError::RecurringEventNotFound { recurring_event_id })?;

        if !recurring.can_generate_more(now) {
            if recurring.is_active {
                self.recurring_repository.deactivate(recurring_event_id).await?;
                info!(recurring_event_id = recurring_event_id, "Recurring event exhausted, deactivated");
            }
            return Ok(None);
        }

        let last_start = self
            .event_repository
            .latest_occurrence_start(recurring_event_id)
            .await?;

        let next_start = recurring.next_occurrence(last_start).ok_or_else(|| {
            LetzError::InvalidInput("recurrence rule produced an out-of-range date".to_string())
        })?;

        let template = self
            .event_repository
            .find_by_id(recurring.template_event_id)
            .await?
            .ok_or(LetzError::EventNotFound {
                event_id: recurring.template_event_id,
            })?;

        // claim this period before inserting; losing the race means another
        // run already generated the occurrence
        let claimed = self
            .recurring_repository
            .increment_occurrences_guarded(recurring_event_id, recurring.current_occurrences)
            .await?;
        if !claimed {
            warn!(
                recurring_event_id = recurring_event_id,
                "Occurrence already generated by a concurrent run"
            );
            return Ok(None);
        }

        let next_end = template
            .end_date_time
            .map(|end| next_start + (end - template.start_date_time));

        let event = self
            .event_repository
            .create_occurrence(
                &template,
                recurring_event_id,
                &generate_invite_code(),
                next_start,
                next_end,
            )
            .await?;

        info!(
            recurring_event_id = recurring_event_id,
            event_id = event.id,
            start = %next_start,
            "Occurrence generated"
        );
        Ok(Some(event))
    }

    /// Generate pending occurrences for every active definition
    ///
    /// Intended for the external periodic driver. Failures on one
    /// definition are logged and do not stop the batch.
    pub async fn generate_due(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut generated = Vec::new();

        for recurring in self.recurring_repository.list_active().await? {
            match self.generate(recurring.id, now).await {
                Ok(Some(event)) => generated.push(event),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        recurring_event_id = recurring.id,
                        error = %e,
                        "Occurrence generation failed"
                    );
                }
            }
        }

        Ok(generated)
    }

    /// Whether the definition can still generate occurrences
    pub async fn can_generate_more(&self, recurring_event_id: i64, now: DateTime<Utc>) -> Result<bool> {
        let recurring = self
            .recurring_repository
            .find_by_id(recurring_event_id)
            .await?
            .ok_or(LetzError::RecurringEventNotFound { recurring_event_id })?;

        Ok(recurring.can_generate_more(now))
    }

    /// Permanently stop generation for a definition
    pub async fn deactivate(&self, recurring_event_id: i64) -> Result<()> {
        let updated = self.recurring_repository.deactivate(recurring_event_id).await?;
        if !updated {
            return Err(LetzError::RecurringEventNotFound { recurring_event_id });
        }
        Ok(())
    }
}
