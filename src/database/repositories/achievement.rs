//! Achievement repository implementation
//!
//! Unlock idempotence is backed by the unique constraint on
//! (user_id, achievement_id): `unlock_once` inserts with ON CONFLICT DO
//! NOTHING and reports whether this call actually created the row.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::achievement::{Achievement, UserAchievement};
use crate::utils::errors::LetzError;

const ACHIEVEMENT_COLUMNS: &str = "id, code, name, description, icon_url, achievement_type, \
     rarity, points_required, events_required, friends_required, points_reward, is_active, \
     created_at, updated_at";

const USER_ACHIEVEMENT_COLUMNS: &str =
    "id, user_id, achievement_id, unlocked_at, progress_value, is_featured, notification_sent";

#[derive(Debug, Clone)]
pub struct AchievementRepository {
    pool: PgPool,
}

impl AchievementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the active achievement catalog
    pub async fn list_active(&self) -> Result<Vec<Achievement>, LetzError> {
        let achievements = sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE is_active = TRUE ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(achievements)
    }

    /// Find achievement by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Achievement>, LetzError> {
        let achievement = sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(achievement)
    }

    /// Find achievement by its unique code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Achievement>, LetzError> {
        let achievement = sqlx::query_as::<_, Achievement>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(achievement)
    }

    /// IDs of achievements the user has already unlocked
    pub async fn unlocked_ids(&self, user_id: i64) -> Result<Vec<i64>, LetzError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT achievement_id FROM user_achievements WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Unlock an achievement at most once per (user, achievement)
    ///
    /// Returns None when the achievement was already unlocked.
    pub async fn unlock_once(
        &self,
        user_id: i64,
        achievement_id: i64,
        progress_value: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<UserAchievement>, LetzError> {
        let unlocked = sqlx::query_as::<_, UserAchievement>(&format!(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id, unlocked_at, progress_value, is_featured, notification_sent)
            VALUES ($1, $2, $3, $4, FALSE, FALSE)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            RETURNING {USER_ACHIEVEMENT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(achievement_id)
        .bind(now)
        .bind(progress_value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(unlocked)
    }

    /// List a user's unlocked achievements, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<UserAchievement>, LetzError> {
        let unlocked = sqlx::query_as::<_, UserAchievement>(&format!(
            "SELECT {USER_ACHIEVEMENT_COLUMNS} FROM user_achievements WHERE user_id = $1 ORDER BY unlocked_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(unlocked)
    }

    /// Unlocks whose owner has not been notified yet
    pub async fn pending_notifications(&self, user_id: i64) -> Result<Vec<UserAchievement>, LetzError> {
        let pending = sqlx::query_as::<_, UserAchievement>(&format!(
            r#"
            SELECT {USER_ACHIEVEMENT_COLUMNS} FROM user_achievements
            WHERE user_id = $1 AND notification_sent = FALSE
            ORDER BY unlocked_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pending)
    }

    /// Flip notification_sent exactly once
    ///
    /// Returns true only on the false -> true transition.
    pub async fn mark_notification_sent(&self, id: i64) -> Result<bool, LetzError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE user_achievements
            SET notification_sent = TRUE
            WHERE id = $1 AND notification_sent = FALSE
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Toggle whether an unlock is featured on the user's profile
    pub async fn set_featured(&self, user_id: i64, achievement_id: i64, featured: bool) -> Result<bool, LetzError> {
        let result = sqlx::query(
            "UPDATE user_achievements SET is_featured = $3 WHERE user_id = $1 AND achievement_id = $2",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(featured)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
