//! Database service layer
//!
//! This module bundles all repositories behind one handle

use crate::database::{
    DatabasePool, UserRepository, EventRepository, ParticipantRepository,
    AchievementRepository, RecurringEventRepository, FriendshipRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub participants: ParticipantRepository,
    pub achievements: AchievementRepository,
    pub recurring_events: RecurringEventRepository,
    pub friendships: FriendshipRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            achievements: AchievementRepository::new(pool.clone()),
            recurring_events: RecurringEventRepository::new(pool.clone()),
            friendships: FriendshipRepository::new(pool),
        }
    }
}
