//! User repository implementation
//!
//! Gamification counter mutations are single atomic UPDATE statements so
//! that concurrent scoring events on the same user cannot lose updates.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::LetzError;

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, bio, is_active, \
     events_created, events_attended, total_friends, points, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, LetzError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, bio, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.email)
        .bind(request.username)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.bio)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, LetzError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, LetzError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record a created event: bumps the counter and awards points
    pub async fn apply_event_created(&self, id: i64, points: i32) -> Result<User, LetzError> {
        self.apply_counter_update(
            id,
            &format!(
                r#"
                UPDATE users
                SET events_created = events_created + 1,
                    points = points + $2,
                    updated_at = $3
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            points,
        )
        .await
    }

    /// Record an attended event: bumps the counter and awards points
    pub async fn apply_event_attended(&self, id: i64, points: i32) -> Result<User, LetzError> {
        self.apply_counter_update(
            id,
            &format!(
                r#"
                UPDATE users
                SET events_attended = events_attended + 1,
                    points = points + $2,
                    updated_at = $3
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            points,
        )
        .await
    }

    /// Record a new friend: bumps the counter and awards points
    pub async fn apply_friend_added(&self, id: i64, points: i32) -> Result<User, LetzError> {
        self.apply_counter_update(
            id,
            &format!(
                r#"
                UPDATE users
                SET total_friends = total_friends + 1,
                    points = points + $2,
                    updated_at = $3
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            points,
        )
        .await
    }

    /// Record a removed friend: counters and points never go below zero
    pub async fn apply_friend_removed(&self, id: i64, points: i32) -> Result<User, LetzError> {
        self.apply_counter_update(
            id,
            &format!(
                r#"
                UPDATE users
                SET total_friends = GREATEST(total_friends - 1, 0),
                    points = GREATEST(points - $2, 0),
                    updated_at = $3
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            points,
        )
        .await
    }

    /// Credit points directly, bypassing the activity counters
    ///
    /// Used for achievement rewards, which must not re-trigger evaluation.
    pub async fn credit_points(&self, id: i64, points: i32) -> Result<User, LetzError> {
        self.apply_counter_update(
            id,
            &format!(
                r#"
                UPDATE users
                SET points = GREATEST(points + $2, 0),
                    updated_at = $3
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ),
            points,
        )
        .await
    }

    async fn apply_counter_update(&self, id: i64, sql: &str, points: i32) -> Result<User, LetzError> {
        let user = sqlx::query_as::<_, User>(sql)
            .bind(id)
            .bind(points)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LetzError::UserNotFound { user_id: id })?;

        Ok(user)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, LetzError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
