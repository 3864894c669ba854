//! Event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::event::{Event, EventAdmin, CreateEventRequest, UpdateEventRequest, EventStatus};
use crate::utils::errors::LetzError;

const EVENT_COLUMNS: &str = "id, title, description, event_type, start_date_time, end_date_time, \
     location, address, latitude, longitude, organizer_id, max_participants, is_private, \
     requires_approval, invite_code, status, recurring_event_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(
        &self,
        organizer_id: i64,
        invite_code: &str,
        request: &CreateEventRequest,
    ) -> Result<Event, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, event_type, start_date_time, end_date_time,
                location, address, latitude, longitude, organizer_id, max_participants,
                is_private, requires_approval, invite_code, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.event_type.to_string())
        .bind(request.start_date_time)
        .bind(request.end_date_time)
        .bind(&request.location)
        .bind(&request.address)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(organizer_id)
        .bind(request.max_participants)
        .bind(request.is_private)
        .bind(request.requires_approval)
        .bind(invite_code)
        .bind(EventStatus::Planned.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Insert a generated occurrence of a recurring event
    pub async fn create_occurrence(
        &self,
        template: &Event,
        recurring_event_id: i64,
        invite_code: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Event, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, event_type, start_date_time, end_date_time,
                location, address, latitude, longitude, organizer_id, max_participants,
                is_private, requires_approval, invite_code, status, recurring_event_id,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.event_type)
        .bind(start)
        .bind(end)
        .bind(&template.location)
        .bind(&template.address)
        .bind(template.latitude)
        .bind(template.longitude)
        .bind(template.organizer_id)
        .bind(template.max_participants)
        .bind(template.is_private)
        .bind(template.requires_approval)
        .bind(invite_code)
        .bind(EventStatus::Planned.as_str())
        .bind(recurring_event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by its invite code
    pub async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Event>, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE invite_code = $1"
        ))
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event fields; organizer and invite code are immutable
    pub async fn update(&self, id: i64, request: &UpdateEventRequest) -> Result<Event, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_type = COALESCE($4, event_type),
                start_date_time = COALESCE($5, start_date_time),
                end_date_time = CASE WHEN $14 THEN NULL ELSE COALESCE($6, end_date_time) END,
                location = COALESCE($7, location),
                address = COALESCE($8, address),
                latitude = COALESCE($9, latitude),
                longitude = COALESCE($10, longitude),
                max_participants = COALESCE($11, max_participants),
                requires_approval = COALESCE($12, requires_approval),
                updated_at = $13
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.event_type.map(|t| t.to_string()))
        .bind(request.start_date_time)
        .bind(request.end_date_time)
        .bind(&request.location)
        .bind(&request.address)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.max_participants)
        .bind(request.requires_approval)
        .bind(Utc::now())
        .bind(request.clear_end_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Set event status
    pub async fn set_status(&self, id: i64, status: EventStatus) -> Result<Event, LetzError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event
    pub async fn delete(&self, id: i64) -> Result<(), LetzError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get events organized by a user, most recent first
    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>, LetzError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY start_date_time DESC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get events a user participates in
    pub async fn list_by_participant(&self, user_id: i64) -> Result<Vec<Event>, LetzError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.title, e.description, e.event_type, e.start_date_time, e.end_date_time,
                   e.location, e.address, e.latitude, e.longitude, e.organizer_id,
                   e.max_participants, e.is_private, e.requires_approval, e.invite_code, e.status,
                   e.recurring_event_id, e.created_at, e.updated_at
            FROM events e
            INNER JOIN event_participants ep ON e.id = ep.event_id
            WHERE ep.user_id = $1
            ORDER BY e.start_date_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get a user's events (organized or joined) inside a time window
    pub async fn list_upcoming_for_user(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, LetzError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT DISTINCT e.id, e.title, e.description, e.event_type, e.start_date_time,
                   e.end_date_time, e.location, e.address, e.latitude, e.longitude,
                   e.organizer_id, e.max_participants, e.is_private, e.requires_approval,
                   e.invite_code, e.status, e.recurring_event_id, e.created_at, e.updated_at
            FROM events e
            LEFT JOIN event_participants ep ON e.id = ep.event_id
            WHERE (e.organizer_id = $1 OR ep.user_id = $1)
              AND e.start_date_time >= $2 AND e.start_date_time < $3
              AND e.status <> 'CANCELLED'
            ORDER BY e.start_date_time ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Start of the latest generated occurrence of a recurring event
    pub async fn latest_occurrence_start(
        &self,
        recurring_event_id: i64,
    ) -> Result<Option<DateTime<Utc>>, LetzError> {
        let row: (Option<DateTime<Utc>>,) = sqlx::query_as(
            "SELECT MAX(start_date_time) FROM events WHERE recurring_event_id = $1",
        )
        .bind(recurring_event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Add a designated admin to an event
    pub async fn add_admin(&self, event_id: i64, user_id: i64, added_by: i64) -> Result<EventAdmin, LetzError> {
        let admin = sqlx::query_as::<_, EventAdmin>(
            r#"
            INSERT INTO event_admins (event_id, user_id, added_by, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id, user_id) DO UPDATE SET added_by = EXCLUDED.added_by
            RETURNING id, event_id, user_id, added_by, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(added_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Remove a designated admin from an event
    pub async fn remove_admin(&self, event_id: i64, user_id: i64) -> Result<bool, LetzError> {
        let result = sqlx::query("DELETE FROM event_admins WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user is a designated admin of an event
    pub async fn is_admin(&self, event_id: i64, user_id: i64) -> Result<bool, LetzError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_admins WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }
}
