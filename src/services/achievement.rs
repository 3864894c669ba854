//! Achievement evaluation service
//!
//! Scans the active achievement catalog against a user's current counters
//! and unlocks everything newly eligible. Unlocking is idempotent: the
//! unique (user, achievement) constraint guarantees an achievement is
//! awarded at most once, and re-evaluating with unchanged counters is a
//! no-op.

use std::collections::HashSet;
use chrono::Utc;
use tracing::{debug, info};

use crate::config::{EventsRequiredPolicy, GamificationConfig};
use crate::database::repositories::{AchievementRepository, UserRepository};
use crate::models::achievement::{Achievement, UserAchievement};
use crate::models::user::User;
use crate::utils::errors::{LetzError, Result};

/// Whether a user's counters satisfy every non-null threshold of an
/// achievement
///
/// An achievement with no thresholds at all is unconditionally eligible.
pub fn is_eligible(achievement: &Achievement, user: &User, policy: EventsRequiredPolicy) -> bool {
    if let Some(required) = achievement.points_required {
        if user.points < required {
            return false;
        }
    }
    if let Some(required) = achievement.events_required {
        let counted = match policy {
            EventsRequiredPolicy::Created => user.events_created,
            EventsRequiredPolicy::Attended => user.events_attended,
            EventsRequiredPolicy::Sum => user.events_created + user.events_attended,
        };
        if counted < required {
            return false;
        }
    }
    if let Some(required) = achievement.friends_required {
        if user.total_friends < required {
            return false;
        }
    }
    true
}

/// Order simultaneous unlocks by ascending rarity, then id
///
/// Keeps point-reward side effects deterministic when several achievements
/// become eligible at once.
pub fn sort_for_unlock(achievements: &mut [Achievement]) {
    achievements.sort_by_key(|a| (a.rarity().rank(), a.id));
}

/// Achievement evaluation service
#[derive(Clone)]
pub struct AchievementService {
    achievement_repository: AchievementRepository,
    user_repository: UserRepository,
    config: GamificationConfig,
}

impl AchievementService {
    pub fn new(
        achievement_repository: AchievementRepository,
        user_repository: UserRepository,
        config: GamificationConfig,
    ) -> Self {
        Self {
            achievement_repository,
            user_repository,
            config,
        }
    }

    /// Evaluate the catalog for a user and unlock newly eligible achievements
    ///
    /// Returns the achievements unlocked by this call, in unlock order.
    pub async fn evaluate(&self, user_id: i64) -> Result<Vec<Achievement>> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(LetzError::UserNotFound { user_id })?;

        let unlocked: HashSet<i64> = self
            .achievement_repository
            .unlocked_ids(user_id)
            .await?
            .into_iter()
            .collect();

        let mut eligible: Vec<Achievement> = self
            .achievement_repository
            .list_active()
            .await?
            .into_iter()
            .filter(|a| !unlocked.contains(&a.id))
            .filter(|a| is_eligible(a, &user, self.config.events_required_policy))
            .collect();

        sort_for_unlock(&mut eligible);

        let mut newly_unlocked = Vec::new();
        let now = Utc::now();

        for achievement in eligible {
            let progress = progress_snapshot(&achievement, &user, self.config.events_required_policy);
            let inserted = self
                .achievement_repository
                .unlock_once(user_id, achievement.id, progress, now)
                .await?;

            // a concurrent evaluation may have won the insert
            if inserted.is_none() {
                continue;
            }

            if achievement.points_reward > 0 {
                // direct credit, deliberately not routed through the scoring
                // triggers so rewards cannot cascade into more evaluations
                self.user_repository
                    .credit_points(user_id, achievement.points_reward)
                    .await?;
            }

            info!(
                user_id = user_id,
                achievement_code = %achievement.code,
                rarity = %achievement.rarity,
                points_reward = achievement.points_reward,
                "Achievement unlocked"
            );
            newly_unlocked.push(achievement);
        }

        debug!(user_id = user_id, count = newly_unlocked.len(), "Achievement evaluation completed");
        Ok(newly_unlocked)
    }

    /// List the active achievement catalog
    pub async fn list_catalog(&self) -> Result<Vec<Achievement>> {
        self.achievement_repository.list_active().await
    }

    /// List a user's unlocked achievements
    pub async fn list_user_achievements(&self, user_id: i64) -> Result<Vec<UserAchievement>> {
        self.achievement_repository.list_for_user(user_id).await
    }

    /// Feature or un-feature an unlocked achievement on the user's profile
    pub async fn set_featured(&self, user_id: i64, achievement_id: i64, featured: bool) -> Result<()> {
        let updated = self
            .achievement_repository
            .set_featured(user_id, achievement_id, featured)
            .await?;

        if !updated {
            return Err(LetzError::AchievementNotFound { achievement_id });
        }
        Ok(())
    }
}

/// Counter value recorded on the unlock row, taken from the achievement's
/// tightest dimension
fn progress_snapshot(achievement: &Achievement, user: &User, policy: EventsRequiredPolicy) -> i32 {
    if achievement.events_required.is_some() {
        return match policy {
            EventsRequiredPolicy::Created => user.events_created,
            EventsRequiredPolicy::Attended => user.events_attended,
            EventsRequiredPolicy::Sum => user.events_created + user.events_attended,
        };
    }
    if achievement.friends_required.is_some() {
        return user.total_friends;
    }
    if achievement.points_required.is_some() {
        return user.points;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(points: i32, created: i32, attended: i32, friends: i32) -> User {
        User {
            id: 1,
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            bio: None,
            is_active: true,
            events_created: created,
            events_attended: attended,
            total_friends: friends,
            points,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn achievement(
        id: i64,
        rarity: &str,
        points: Option<i32>,
        events: Option<i32>,
        friends: Option<i32>,
    ) -> Achievement {
        Achievement {
            id,
            code: format!("ACH_{}", id),
            name: format!("Achievement {}", id),
            description: None,
            icon_url: None,
            achievement_type: "SPECIAL".to_string(),
            rarity: rarity.to_string(),
            points_required: points,
            events_required: events,
            friends_required: friends,
            points_reward: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_thresholds_must_hold() {
        let a = achievement(1, "RARE", Some(100), Some(5), Some(3));
        assert!(is_eligible(&a, &user_with(100, 3, 2, 3), EventsRequiredPolicy::Sum));
        assert!(!is_eligible(&a, &user_with(99, 3, 2, 3), EventsRequiredPolicy::Sum));
        assert!(!is_eligible(&a, &user_with(100, 3, 2, 2), EventsRequiredPolicy::Sum));
        assert!(!is_eligible(&a, &user_with(100, 2, 2, 3), EventsRequiredPolicy::Sum));
    }

    #[test]
    fn test_threshold_free_achievement_is_always_eligible() {
        let a = achievement(1, "COMMON", None, None, None);
        assert!(is_eligible(&a, &user_with(0, 0, 0, 0), EventsRequiredPolicy::Sum));
    }

    #[test]
    fn test_events_required_policy() {
        let a = achievement(1, "COMMON", None, Some(4), None);
        let user = user_with(0, 3, 1, 0);
        assert!(is_eligible(&a, &user, EventsRequiredPolicy::Sum));
        assert!(!is_eligible(&a, &user, EventsRequiredPolicy::Created));
        assert!(!is_eligible(&a, &user, EventsRequiredPolicy::Attended));
    }

    #[test]
    fn test_unlock_ordering_by_rarity_then_id() {
        let mut batch = vec![
            achievement(4, "LEGENDARY", None, None, None),
            achievement(3, "COMMON", None, None, None),
            achievement(2, "EPIC", None, None, None),
            achievement(1, "COMMON", None, None, None),
        ];
        sort_for_unlock(&mut batch);
        let ids: Vec<i64> = batch.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_progress_snapshot_prefers_events_dimension() {
        let user = user_with(500, 3, 4, 2);
        let a = achievement(1, "RARE", Some(100), Some(5), None);
        assert_eq!(progress_snapshot(&a, &user, EventsRequiredPolicy::Sum), 7);

        let b = achievement(2, "RARE", Some(100), None, None);
        assert_eq!(progress_snapshot(&b, &user, EventsRequiredPolicy::Sum), 500);

        let c = achievement(3, "COMMON", None, None, None);
        assert_eq!(progress_snapshot(&c, &user, EventsRequiredPolicy::Sum), 0);
    }
}
