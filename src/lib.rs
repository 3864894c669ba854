//! Letz gamification engine
//!
//! Core engine for a social events platform: event lifecycle and
//! participation, a points/level scoring system, an achievement catalog
//! with automatic unlocking, recurring event generation and friendships.
//! Delivery of notifications is left to the embedding application via the
//! [`services::NotificationDispatcher`] trait.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{LetzError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
