//! Gamification scoring service
//!
//! Applies point and counter deltas for qualifying user actions. Each
//! mutation is a single atomic UPDATE (per-user serialization happens in
//! the database), and every mutation ends with an achievement evaluation
//! pass.

use std::sync::Arc;
use tracing::debug;

use crate::config::GamificationConfig;
use crate::database::repositories::UserRepository;
use crate::models::user::{User, UserStats};
use crate::services::achievement::AchievementService;
use crate::services::notification::NotificationDispatcher;
use crate::utils::errors::{LetzError, Result};
use crate::utils::logging::log_points_awarded;

/// Level as a pure function of points
///
/// The table is fixed for compatibility with existing user data:
/// below 100 -> 1, below 300 -> 2, below 600 -> 3, below 1000 -> 4,
/// otherwise 5.
pub fn calculate_level(points: i32) -> i32 {
    if points < 100 {
        1
    } else if points < 300 {
        2
    } else if points < 600 {
        3
    } else if points < 1000 {
        4
    } else {
        5
    }
}

/// Gamification scoring service
#[derive(Clone)]
pub struct GamificationService {
    user_repository: UserRepository,
    achievement_service: AchievementService,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: GamificationConfig,
}

impl GamificationService {
    pub fn new(
        user_repository: UserRepository,
        achievement_service: AchievementService,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: GamificationConfig,
    ) -> Self {
        Self {
            user_repository,
            achievement_service,
            dispatcher,
            config,
        }
    }

    /// Score a created event for its organizer
    pub async fn on_event_created(&self, user_id: i64) -> Result<User> {
        let points = self.config.points_per_event_created;
        let user = self.user_repository.apply_event_created(user_id, points).await?;
        log_points_awarded(user_id, points, "event_created");
        self.finish_mutation(user_id, &user, points).await?;
        Ok(user)
    }

    /// Score an attended event for the attendee
    pub async fn on_event_attended(&self, user_id: i64) -> Result<User> {
        let points = self.config.points_per_event_attended;
        let user = self.user_repository.apply_event_attended(user_id, points).await?;
        log_points_awarded(user_id, points, "event_attended");
        self.finish_mutation(user_id, &user, points).await?;
        Ok(user)
    }

    /// Score a new friendship for one of its members
    pub async fn on_friend_added(&self, user_id: i64) -> Result<User> {
        let points = self.config.points_per_friend_added;
        let user = self.user_repository.apply_friend_added(user_id, points).await?;
        log_points_awarded(user_id, points, "friend_added");
        self.finish_mutation(user_id, &user, points).await?;
        Ok(user)
    }

    /// Score a removed friendship; counters and points floor at zero
    pub async fn on_friend_removed(&self, user_id: i64) -> Result<User> {
        let points = self.config.points_per_friend_added;
        let user = self.user_repository.apply_friend_removed(user_id, points).await?;
        debug!(user_id = user_id, points = -points, "Points deducted for removed friend");
        // points only went down, no level-up check
        self.achievement_service.evaluate(user_id).await?;
        Ok(user)
    }

    /// Current aggregate stats for a user
    pub async fn get_user_stats(&self, user_id: i64) -> Result<UserStats> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(LetzError::UserNotFound { user_id })?;

        Ok(UserStats {
            user_id: user.id,
            points: user.points,
            level: calculate_level(user.points),
            events_created: user.events_created,
            events_attended: user.events_attended,
            total_friends: user.total_friends,
        })
    }

    async fn finish_mutation(&self, user_id: i64, user: &User, awarded: i32) -> Result<()> {
        let level_before = calculate_level((user.points - awarded).max(0));
        let level_after = calculate_level(user.points);
        if level_after > level_before {
            self.dispatcher.level_up(user, level_after);
        }

        self.achievement_service.evaluate(user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_boundaries() {
        assert_eq!(calculate_level(0), 1);
        assert_eq!(calculate_level(99), 1);
        assert_eq!(calculate_level(100), 2);
        assert_eq!(calculate_level(299), 2);
        assert_eq!(calculate_level(300), 3);
        assert_eq!(calculate_level(599), 3);
        assert_eq!(calculate_level(600), 4);
        assert_eq!(calculate_level(999), 4);
        assert_eq!(calculate_level(1000), 5);
        assert_eq!(calculate_level(100_000), 5);
    }
}
