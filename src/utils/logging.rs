//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Letz engine.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
///
/// The returned guard owns the background writer for the rolling file
/// layer; the caller must keep it alive for the lifetime of the process or
/// file logging stops.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "letz-engine.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log participation state changes with structured data
pub fn log_participation_change(event_id: i64, user_id: i64, from: &str, to: &str) {
    info!(
        event_id = event_id,
        user_id = user_id,
        from = from,
        to = to,
        "Participation status changed"
    );
}

/// Log point awards
pub fn log_points_awarded(user_id: i64, points: i32, reason: &str) {
    info!(
        user_id = user_id,
        points = points,
        reason = reason,
        "Points awarded"
    );
}

/// Log organizer/admin actions on events
pub fn log_event_action(event_id: i64, action: &str, acting_user_id: i64, target_user_id: Option<i64>) {
    warn!(
        event_id = event_id,
        action = action,
        acting_user_id = acting_user_id,
        target_user_id = target_user_id,
        "Event management action performed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_hands_the_writer_guard_to_the_caller() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file_path: std::env::temp_dir()
                .join("letz-engine-log-test")
                .to_string_lossy()
                .to_string(),
        };

        // the file layer only survives as long as the returned guard does
        let guard = init_logging(&config).unwrap();
        info!("log line emitted while the guard is alive");
        drop(guard);
    }
}
