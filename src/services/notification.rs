//! Notification decision service
//!
//! The engine only decides that a notification is due; actual delivery
//! (push, email) is an external capability behind the
//! [`NotificationDispatcher`] trait. The `notification_sent` flag flips
//! false -> true exactly once per unlock, so a crashed delivery run can be
//! retried without double-notifying.

use std::sync::Arc;
use tracing::{debug, info};

use crate::database::repositories::{AchievementRepository, UserRepository};
use crate::models::achievement::Achievement;
use crate::models::user::User;
use crate::utils::errors::{LetzError, Result};

/// Outbound notification capability, implemented by the surrounding
/// service layer
pub trait NotificationDispatcher: Send + Sync {
    fn achievement_unlocked(&self, user: &User, achievement: &Achievement);
    fn level_up(&self, user: &User, new_level: i32);
}

/// Default dispatcher that only logs the decision
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn achievement_unlocked(&self, user: &User, achievement: &Achievement) {
        info!(
            user_id = user.id,
            achievement_code = %achievement.code,
            "Achievement notification due"
        );
    }

    fn level_up(&self, user: &User, new_level: i32) {
        info!(user_id = user.id, new_level = new_level, "Level-up notification due");
    }
}

/// Notification decision service
#[derive(Clone)]
pub struct NotificationService {
    achievement_repository: AchievementRepository,
    user_repository: UserRepository,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationService {
    pub fn new(
        achievement_repository: AchievementRepository,
        user_repository: UserRepository,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            achievement_repository,
            user_repository,
            dispatcher,
        }
    }

    /// Dispatch all pending achievement notifications for a user
    ///
    /// Returns the number of notifications handed to the dispatcher.
    pub async fn dispatch_pending(&self, user_id: i64) -> Result<usize> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(LetzError::UserNotFound { user_id })?;

        let pending = self.achievement_repository.pending_notifications(user_id).await?;
        let mut dispatched = 0;

        for unlock in pending {
            // a concurrent dispatch run may already have claimed this row
            if !self.achievement_repository.mark_notification_sent(unlock.id).await? {
                continue;
            }

            if let Some(achievement) = self
                .achievement_repository
                .find_by_id(unlock.achievement_id)
                .await?
            {
                self.dispatcher.achievement_unlocked(&user, &achievement);
                dispatched += 1;
            }
        }

        debug!(user_id = user_id, dispatched = dispatched, "Pending notifications dispatched");
        Ok(dispatched)
    }
}
