//! Data models module
//!
//! This module contains all data structures used throughout the engine

pub mod user;
pub mod event;
pub mod achievement;
pub mod recurring;
pub mod friendship;

// Re-export commonly used models
pub use user::{User, CreateUserRequest, UserStats};
pub use event::{
    Event, EventParticipant, EventAdmin, CreateEventRequest, UpdateEventRequest,
    EventType, EventStatus, ParticipationStatus,
};
pub use achievement::{Achievement, UserAchievement, AchievementType, AchievementRarity};
pub use recurring::{RecurringEvent, CreateRecurringEventRequest, RecurrenceType};
pub use friendship::{Friendship, FriendshipStatus};
