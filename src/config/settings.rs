//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub upload_timeout_seconds: u64,
    pub user_agent: String,
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub storage_path: String,
    pub watch_interval_ms: u64,
}

/// Attendance scanner timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    pub token_length: usize,
    pub scan_pause_ms: u64,
    pub success_display_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    /// Re-validate the session before state-changing calls
    pub eager_token_validation: bool,
    /// Reject tokens whose `exp` claim has passed without a round trip
    pub local_expiry_check: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("EVENTSPHERE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventSphereError> {
        super::validation::validate_settings(self)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, crate::utils::errors::EventSphereError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::utils::errors::EventSphereError::Config(e.to_string()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            scanner: ScannerConfig::default(),
            logging: LoggingConfig::default(),
            features: FeaturesConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            upload_timeout_seconds: 10,
            user_agent: format!("EventSphere-Client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: ".eventsphere/session.json".to_string(),
            watch_interval_ms: 1000,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            token_length: 6,
            scan_pause_ms: 3000,
            success_display_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_path: "logs".to_string(),
            json: false,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            eager_token_validation: true,
            local_expiry_check: true,
        }
    }
}
