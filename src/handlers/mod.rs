//! Command-line handlers module
//!
//! This module contains the thin view layer of the `eventsphere` binary:
//! - Command definitions and the dispatcher
//! - Rendering helpers for events, participants and reports

pub mod commands;
pub mod output;

// Re-export commonly used handler items
pub use commands::{handle_command, Cli, Command};
pub use output::exit_code;

use crate::services::ServiceFailure;

/// Result of a command; failures carry the user-facing message only
pub type HandlerResult = std::result::Result<(), ServiceFailure>;
