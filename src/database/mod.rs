//! Database module
//!
//! This module contains database connection and repository implementations

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{DatabasePool, PoolConfig, create_pool, run_migrations, health_check};
pub use repositories::{
    UserRepository, EventRepository, ParticipantRepository,
    AchievementRepository, RecurringEventRepository, FriendshipRepository,
};
pub use service::DatabaseService;
