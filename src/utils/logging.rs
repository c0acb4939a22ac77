//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventSphere client.

use std::time::Duration;
use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{EventSphereError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped and must be
/// held for the lifetime of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "eventsphere.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(non_blocking).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| EventSphereError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a completed API call
pub fn log_api_call(method: &str, path: &str, status: Option<u16>, elapsed: Duration) {
    debug!(
        method = method,
        path = path,
        status = status,
        duration_ms = elapsed.as_millis() as u64,
        "API call completed"
    );
}

/// Log event lifecycle and management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: Option<i64>, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log session lifecycle changes
pub fn log_session_event(event: &str, username: Option<&str>) {
    info!(
        event = event,
        username = username,
        "Session event"
    );
}

/// Log attendance scan outcomes
pub fn log_scan_result(token: &str, outcome: &str) {
    info!(
        token = token,
        outcome = outcome,
        "Attendance scan processed"
    );
}

/// Log API errors with context
pub fn log_api_error(context: &str, error: &str, status: Option<u16>) {
    error!(
        context = context,
        error = error,
        status = status,
        "API error occurred"
    );
}

/// Log a rejected operation that needs no diagnostics
pub fn log_rejected(context: &str, reason: &str) {
    warn!(
        context = context,
        reason = reason,
        "Operation rejected"
    );
}
