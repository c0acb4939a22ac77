//! EventSphere client
//!
//! Client-side core of the EventSphere event management platform.
//! This library provides the API client and session guard, event and
//! participant services, access derivation, the attendance scanner and a
//! thin command-line view layer.

pub mod api;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventSphereError, Result};

// Re-export main components for easy access
pub use api::ApiClient;
pub use middleware::SessionGuard;
pub use services::{ServiceFactory, ServiceResponse};
pub use state::{FileSessionStore, MemorySessionStore, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
