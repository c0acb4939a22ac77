//! Utility modules
//!
//! This module contains common utilities used throughout the client,
//! including error handling, logging setup, validation and helper functions.

pub mod errors;
pub mod helpers;
pub mod logging;
pub mod validators;

pub use errors::{ErrorCategory, ErrorSeverity, EventSphereError, Result};
