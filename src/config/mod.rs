//! Configuration module

pub mod settings;
pub mod validation;

pub use settings::{Settings, DatabaseConfig, GamificationConfig, EventsRequiredPolicy, LoggingConfig};
