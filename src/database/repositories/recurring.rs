//! Recurring event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::recurring::{RecurringEvent, CreateRecurringEventRequest};
use crate::utils::errors::LetzError;

const RECURRING_COLUMNS: &str = "id, template_event_id, recurrence_type, recurrence_interval, \
     days_of_week, day_of_month, week_of_month, start_date, end_date, max_occurrences, \
     current_occurrences, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct RecurringEventRepository {
    pool: PgPool,
}

impl RecurringEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a recurrence definition
    pub async fn create(&self, request: &CreateRecurringEventRequest) -> Result<RecurringEvent, LetzError> {
        let recurring = sqlx::query_as::<_, RecurringEvent>(&format!(
            r#"
            INSERT INTO recurring_events (template_event_id, recurrence_type, recurrence_interval,
                days_of_week, day_of_month, week_of_month, start_date, end_date, max_occurrences,
                current_occurrences, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, TRUE, $10, $10)
            RETURNING {RECURRING_COLUMNS}
            "#
        ))
        .bind(request.template_event_id)
        .bind(request.recurrence_type.to_string())
        .bind(request.recurrence_interval)
        .bind(&request.days_of_week)
        .bind(request.day_of_month)
        .bind(request.week_of_month)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.max_occurrences)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(recurring)
    }

    /// Find recurrence definition by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<RecurringEvent>, LetzError> {
        let recurring = sqlx::query_as::<_, RecurringEvent>(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recurring)
    }

    /// List active recurrence definitions
    pub async fn list_active(&self) -> Result<Vec<RecurringEvent>, LetzError> {
        let recurring = sqlx::query_as::<_, RecurringEvent>(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_events WHERE is_active = TRUE ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(recurring)
    }

    /// Increment current_occurrences only when it still matches the expected
    /// value
    ///
    /// The expected value acts as the idempotency key: a concurrent or
    /// re-run generation for the same period loses the race and generates
    /// nothing. Returns true when this call won.
    pub async fn increment_occurrences_guarded(&self, id: i64, expected: i32) -> Result<bool, LetzError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE recurring_events
            SET current_occurrences = current_occurrences + 1, updated_at = $3
            WHERE id = $1 AND current_occurrences = $2
            RETURNING current_occurrences
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Clear the active flag, permanently stopping generation
    pub async fn deactivate(&self, id: i64) -> Result<bool, LetzError> {
        let result = sqlx::query(
            "UPDATE recurring_events SET is_active = FALSE, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
