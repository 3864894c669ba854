//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main engine configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub gamification: GamificationConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Gamification configuration
///
/// Point values awarded per qualifying action. The level thresholds are
/// fixed in code for compatibility with existing user data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GamificationConfig {
    pub points_per_event_created: i32,
    pub points_per_event_attended: i32,
    pub points_per_friend_added: i32,
    pub events_required_policy: EventsRequiredPolicy,
}

/// Which counters the `events_required` achievement threshold compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventsRequiredPolicy {
    Created,
    Attended,
    Sum,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("LETZ"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LetzError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/letz".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            gamification: GamificationConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/letz".to_string(),
            },
        }
    }
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            points_per_event_created: 50,
            points_per_event_attended: 20,
            points_per_friend_added: 10,
            events_required_policy: EventsRequiredPolicy::Sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_point_values() {
        let config = GamificationConfig::default();
        assert_eq!(config.points_per_event_created, 50);
        assert_eq!(config.points_per_event_attended, 20);
        assert_eq!(config.points_per_friend_added, 10);
        assert_eq!(config.events_required_policy, EventsRequiredPolicy::Sum);
    }
}
