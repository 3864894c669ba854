//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod participant;
pub mod achievement;
pub mod recurring;
pub mod friendship;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use participant::ParticipantRepository;
pub use achievement::AchievementRepository;
pub use recurring::RecurringEventRepository;
pub use friendship::FriendshipRepository;
