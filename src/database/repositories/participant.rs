//! Event participant repository implementation
//!
//! The join path is the capacity critical section: the event row is locked
//! for the duration of the check-then-insert so that two concurrent joins
//! cannot both pass a full capacity boundary. The unique constraint on
//! (event_id, user_id) backs the one-row-per-pair invariant.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::event::{EventParticipant, ParticipationStatus};
use crate::utils::errors::LetzError;

const PARTICIPANT_COLUMNS: &str =
    "id, event_id, user_id, status, has_attended, confirmed_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a participant, re-validating capacity under a row lock
    ///
    /// `confirmed_at` is set only when the initial status is CONFIRMED.
    pub async fn register_guarded(
        &self,
        event_id: i64,
        user_id: i64,
        status: ParticipationStatus,
        now: DateTime<Utc>,
    ) -> Result<EventParticipant, LetzError> {
        let mut tx = self.pool.begin().await?;

        let event_row: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT max_participants FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let max_participants = event_row
            .ok_or(LetzError::EventNotFound { event_id })?
            .0;

        if let Some(max) = max_participants {
            let confirmed: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status = 'CONFIRMED'",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

            if confirmed.0 >= i64::from(max) {
                return Err(LetzError::EventFull { event_id });
            }
        }

        let confirmed_at = match status {
            ParticipationStatus::Confirmed => Some(now),
            _ => None,
        };

        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            INSERT INTO event_participants (event_id, user_id, status, has_attended, confirmed_at, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $4, $5, $5)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(confirmed_at)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                LetzError::AlreadyParticipating { event_id, user_id }
            }
            _ => LetzError::from(e),
        })?;

        tx.commit().await?;

        Ok(participant)
    }

    /// Confirm a participant, re-validating capacity under a row lock
    ///
    /// Approval is the second door into CONFIRMED, so it holds the same
    /// event-row lock as registration: without it, joins that passed while
    /// the confirmed count was low could all be approved past the limit.
    pub async fn confirm_guarded(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<EventParticipant, LetzError> {
        let mut tx = self.pool.begin().await?;

        let event_row: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT max_participants FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let max_participants = event_row
            .ok_or(LetzError::EventNotFound { event_id })?
            .0;

        if let Some(max) = max_participants {
            let confirmed: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status = 'CONFIRMED'",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

            if confirmed.0 >= i64::from(max) {
                return Err(LetzError::EventFull { event_id });
            }
        }

        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants
            SET status = $3, confirmed_at = $4, updated_at = $4
            WHERE event_id = $1 AND user_id = $2
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(ParticipationStatus::Confirmed.as_str())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LetzError::NotParticipating { event_id, user_id })?;

        tx.commit().await?;

        Ok(participant)
    }

    /// Find a participation row for (event, user)
    pub async fn find_by_event_and_user(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<EventParticipant>, LetzError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Check if a participation row exists for (event, user)
    pub async fn exists(&self, event_id: i64, user_id: i64) -> Result<bool, LetzError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Count CONFIRMED participants of an event
    pub async fn count_confirmed(&self, event_id: i64) -> Result<i64, LetzError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// List participants of an event in join order
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<EventParticipant>, LetzError> {
        let participants = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 ORDER BY created_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Update participation status; sets confirmed_at on CONFIRMED
    pub async fn update_status(
        &self,
        event_id: i64,
        user_id: i64,
        status: ParticipationStatus,
        now: DateTime<Utc>,
    ) -> Result<EventParticipant, LetzError> {
        let confirmed_at = match status {
            ParticipationStatus::Confirmed => Some(now),
            _ => None,
        };

        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants
            SET status = $3,
                confirmed_at = COALESCE($4, confirmed_at),
                updated_at = $5
            WHERE event_id = $1 AND user_id = $2
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(confirmed_at)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LetzError::NotParticipating { event_id, user_id })?;

        Ok(participant)
    }

    /// Mark attendance exactly once
    ///
    /// Returns true only on the false -> true transition; repeated calls are
    /// no-ops, which keeps the downstream scoring trigger idempotent.
    pub async fn mark_attended_once(
        &self,
        event_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, LetzError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE event_participants
            SET has_attended = TRUE, updated_at = $3
            WHERE event_id = $1 AND user_id = $2 AND has_attended = FALSE
            RETURNING id
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Remove a participation row; the user becomes eligible to join again
    pub async fn delete(&self, event_id: i64, user_id: i64) -> Result<bool, LetzError> {
        let result = sqlx::query(
            "DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
