//! Error handling for the Letz engine
//!
//! This module defines the main error types used throughout the engine
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Letz engine
#[derive(Error, Debug)]
pub enum LetzError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Recurring event not found: {recurring_event_id}")]
    RecurringEventNotFound { recurring_event_id: i64 },

    #[error("Achievement not found: {achievement_id}")]
    AchievementNotFound { achievement_id: i64 },

    #[error("User {user_id} already participates in event {event_id}")]
    AlreadyParticipating { event_id: i64, user_id: i64 },

    #[error("User {user_id} is not participating in event {event_id}")]
    NotParticipating { event_id: i64, user_id: i64 },

    #[error("Event {event_id} has reached its participant limit")]
    EventFull { event_id: i64 },

    #[error("No friendship between users {user_id} and {other_user_id}")]
    FriendshipNotFound { user_id: i64, other_user_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Letz engine operations
pub type Result<T> = std::result::Result<T, LetzError>;

impl LetzError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LetzError::Database(_) => false,
            LetzError::Migration(_) => false,
            LetzError::Config(_) => false,
            LetzError::PermissionDenied(_) => false,
            LetzError::UserNotFound { .. } => false,
            LetzError::EventNotFound { .. } => false,
            LetzError::RecurringEventNotFound { .. } => false,
            LetzError::AchievementNotFound { .. } => false,
            LetzError::AlreadyParticipating { .. } => false,
            LetzError::NotParticipating { .. } => false,
            LetzError::EventFull { .. } => true,
            LetzError::FriendshipNotFound { .. } => false,
            LetzError::InvalidStateTransition { .. } => false,
            LetzError::Serialization(_) => false,
            LetzError::Io(_) => true,
            LetzError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LetzError::Database(_) => ErrorSeverity::Critical,
            LetzError::Migration(_) => ErrorSeverity::Critical,
            LetzError::Config(_) => ErrorSeverity::Critical,
            LetzError::PermissionDenied(_) => ErrorSeverity::Warning,
            LetzError::EventFull { .. } => ErrorSeverity::Info,
            LetzError::AlreadyParticipating { .. } => ErrorSeverity::Info,
            LetzError::NotParticipating { .. } => ErrorSeverity::Info,
            LetzError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
