//! Friendship repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::friendship::{Friendship, FriendshipStatus};
use crate::utils::errors::LetzError;

const FRIENDSHIP_COLUMNS: &str =
    "id, requester_id, addressee_id, status, accepted_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending friend request
    ///
    /// The pair-wide unique index catches concurrent requests in either
    /// direction that both passed the service-level duplicate check.
    pub async fn create(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship, LetzError> {
        let friendship = sqlx::query_as::<_, Friendship>(&format!(
            r#"
            INSERT INTO friendships (requester_id, addressee_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        ))
        .bind(requester_id)
        .bind(addressee_id)
        .bind(FriendshipStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => LetzError::InvalidInput(
                "a friendship between these users already exists".to_string(),
            ),
            _ => LetzError::from(e),
        })?;

        Ok(friendship)
    }

    /// Find a friendship between two users, in either direction
    pub async fn find_between(&self, user_id: i64, other_user_id: i64) -> Result<Option<Friendship>, LetzError> {
        let friendship = sqlx::query_as::<_, Friendship>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS} FROM friendships
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            "#
        ))
        .bind(user_id)
        .bind(other_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    /// Update friendship status; sets accepted_at on ACCEPTED
    pub async fn update_status(
        &self,
        id: i64,
        status: FriendshipStatus,
        now: DateTime<Utc>,
    ) -> Result<Friendship, LetzError> {
        let accepted_at = match status {
            FriendshipStatus::Accepted => Some(now),
            _ => None,
        };

        let friendship = sqlx::query_as::<_, Friendship>(&format!(
            r#"
            UPDATE friendships
            SET status = $2,
                accepted_at = COALESCE($3, accepted_at),
                updated_at = $4
            WHERE id = $1
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(accepted_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(friendship)
    }

    /// Delete a friendship row
    pub async fn delete(&self, id: i64) -> Result<(), LetzError> {
        sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List a user's accepted friendships
    pub async fn list_accepted(&self, user_id: i64) -> Result<Vec<Friendship>, LetzError> {
        let friendships = sqlx::query_as::<_, Friendship>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS} FROM friendships
            WHERE (requester_id = $1 OR addressee_id = $1) AND status = 'ACCEPTED'
            ORDER BY accepted_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friendships)
    }
}
