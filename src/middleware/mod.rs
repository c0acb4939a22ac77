//! Middleware module
//!
//! This module contains the layers every API request passes through

pub mod logging;
pub mod session_guard;

// Re-export commonly used middleware
pub use logging::{RequestLogger, RequestTracker};
pub use session_guard::{token_expired, SessionGuard};
