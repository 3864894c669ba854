//! Services module
//!
//! This module contains the business logic services

pub mod achievement;
pub mod event;
pub mod friendship;
pub mod gamification;
pub mod notification;
pub mod participation;
pub mod recurrence;

// Re-export commonly used services
pub use achievement::AchievementService;
pub use event::EventService;
pub use friendship::FriendshipService;
pub use gamification::{calculate_level, GamificationService};
pub use notification::{LogDispatcher, NotificationDispatcher, NotificationService};
pub use participation::ParticipationService;
pub use recurrence::RecurrenceService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and wiring all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub participation_service: ParticipationService,
    pub gamification_service: GamificationService,
    pub achievement_service: AchievementService,
    pub recurrence_service: RecurrenceService,
    pub friendship_service: FriendshipService,
    pub notification_service: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: Settings,
        database: DatabaseService,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let achievement_service = AchievementService::new(
            database.achievements.clone(),
            database.users.clone(),
            settings.gamification.clone(),
        );
        let gamification_service = GamificationService::new(
            database.users.clone(),
            achievement_service.clone(),
            dispatcher.clone(),
            settings.gamification.clone(),
        );
        let event_service = EventService::new(
            database.events.clone(),
            database.participants.clone(),
            gamification_service.clone(),
        );
        let participation_service = ParticipationService::new(
            database.events.clone(),
            database.participants.clone(),
            gamification_service.clone(),
        );
        let recurrence_service =
            RecurrenceService::new(database.recurring_events.clone(), database.events.clone());
        let friendship_service = FriendshipService::new(
            database.friendships.clone(),
            database.users.clone(),
            gamification_service.clone(),
        );
        let notification_service = NotificationService::new(
            database.achievements.clone(),
            database.users.clone(),
            dispatcher,
        );

        Self {
            event_service,
            participation_service,
            gamification_service,
            achievement_service,
            recurrence_service,
            friendship_service,
            notification_service,
        }
    }

    /// Convenience constructor with the log-only dispatcher
    pub fn with_log_dispatcher(settings: Settings, database: DatabaseService) -> Self {
        Self::new(settings, database, Arc::new(LogDispatcher))
    }
}
