//! Friendship service
//!
//! Friend requests and their acceptance drive the social scoring
//! triggers: accepting a request scores both users, removing an accepted
//! friendship deducts from both.

use chrono::Utc;
use tracing::info;

use crate::database::repositories::{FriendshipRepository, UserRepository};
use crate::models::friendship::{Friendship, FriendshipStatus};
use crate::services::gamification::GamificationService;
use crate::utils::errors::{LetzError, Result};

/// Friendship service
#[derive(Clone)]
pub struct FriendshipService {
    friendship_repository: FriendshipRepository,
    user_repository: UserRepository,
    gamification_service: GamificationService,
}

impl FriendshipService {
    pub fn new(
        friendship_repository: FriendshipRepository,
        user_repository: UserRepository,
        gamification_service: GamificationService,
    ) -> Self {
        Self {
            friendship_repository,
            user_repository,
            gamification_service,
        }
    }

    /// Send a friend request
    pub async fn send_request(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        if requester_id == addressee_id {
            return Err(LetzError::InvalidInput(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        self.require_user(addressee_id).await?;

        if self
            .friendship_repository
            .find_between(requester_id, addressee_id)
            .await?
            .is_some()
        {
            return Err(LetzError::InvalidInput(
                "a friendship between these users already exists".to_string(),
            ));
        }

        let friendship = self.friendship_repository.create(requester_id, addressee_id).await?;
        info!(
            requester_id = requester_id,
            addressee_id = addressee_id,
            "Friend request sent"
        );
        Ok(friendship)
    }

    /// Accept a pending friend request (addressee only); scores both users
    pub async fn accept_request(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        let friendship = self.require_pending(requester_id, addressee_id).await?;

        let accepted = self
            .friendship_repository
            .update_status(friendship.id, FriendshipStatus::Accepted, Utc::now())
            .await?;

        self.gamification_service.on_friend_added(requester_id).await?;
        self.gamification_service.on_friend_added(addressee_id).await?;

        info!(
            requester_id = requester_id,
            addressee_id = addressee_id,
            "Friend request accepted"
        );
        Ok(accepted)
    }

    /// Reject a pending friend request (addressee only)
    pub async fn reject_request(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        let friendship = self.require_pending(requester_id, addressee_id).await?;

        self.friendship_repository
            .update_status(friendship.id, FriendshipStatus::Rejected, Utc::now())
            .await
    }

    /// Remove a friendship; an accepted one deducts points from both users
    pub async fn remove(&self, user_id: i64, other_user_id: i64) -> Result<()> {
        let friendship = self
            .friendship_repository
            .find_between(user_id, other_user_id)
            .await?
            .ok_or(LetzError::FriendshipNotFound { user_id, other_user_id })?;

        let was_accepted = friendship.is_accepted();
        self.friendship_repository.delete(friendship.id).await?;

        if was_accepted {
            self.gamification_service.on_friend_removed(user_id).await?;
            self.gamification_service.on_friend_removed(other_user_id).await?;
        }

        info!(user_id = user_id, other_user_id = other_user_id, "Friendship removed");
        Ok(())
    }

    /// List a user's accepted friendships
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<Friendship>> {
        self.friendship_repository.list_accepted(user_id).await
    }

    async fn require_pending(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        let friendship = self
            .friendship_repository
            .find_between(requester_id, addressee_id)
            .await?
            .ok_or(LetzError::FriendshipNotFound {
                user_id: requester_id,
                other_user_id: addressee_id,
            })?;

        // only the addressee of the original request may act on it
        if friendship.addressee_id != addressee_id || friendship.requester_id != requester_id {
            return Err(LetzError::PermissionDenied(
                "only the request's addressee can respond to it".to_string(),
            ));
        }

        let status = friendship.friendship_status();
        if status != FriendshipStatus::Pending {
            return Err(LetzError::InvalidStateTransition {
                from: status.to_string(),
                to: FriendshipStatus::Accepted.to_string(),
            });
        }

        Ok(friendship)
    }

    async fn require_user(&self, user_id: i64) -> Result<()> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(LetzError::UserNotFound { user_id })?;
        Ok(())
    }
}
