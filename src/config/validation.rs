//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventSphereError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_session_config(&settings.session)?;
    validate_scanner_config(&settings.scanner)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate remote API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(EventSphereError::Config(
            "API base URL is required".to_string()
        ));
    }

    let parsed = url::Url::parse(&config.base_url)
        .map_err(|e| EventSphereError::Config(format!("Invalid API base URL: {}", e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(EventSphereError::Config(
            format!("Unsupported API URL scheme: {}", parsed.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EventSphereError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    if config.upload_timeout_seconds == 0 {
        return Err(EventSphereError::Config(
            "Upload timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate session persistence configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.storage_path.is_empty() {
        return Err(EventSphereError::Config(
            "Session storage path is required".to_string()
        ));
    }

    if config.watch_interval_ms == 0 {
        return Err(EventSphereError::Config(
            "Session watch interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate scanner configuration
fn validate_scanner_config(config: &super::ScannerConfig) -> Result<()> {
    // Presence tokens are issued by the server as 6-digit codes
    if config.token_length != 6 {
        return Err(EventSphereError::Config(
            format!("Scanner token length must be 6, got {}", config.token_length)
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventSphereError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventSphereError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
