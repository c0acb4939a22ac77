//! Error handling for EventSphere
//!
//! This module defines the main error type used throughout the client
//! and the client-side classification used to decide how a failure is
//! reported to the user.

use thiserror::Error;

/// Server message fragments that mark a benign "participant already present" conflict
pub const ALREADY_PRESENT_MARKERS: [&str; 2] = ["já está presente", "already present"];

/// Main error type for the EventSphere client
#[derive(Error, Debug)]
pub enum EventSphereError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server unreachable: {0}")]
    Network(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyPresent(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Result type alias for EventSphere operations
pub type Result<T> = std::result::Result<T, EventSphereError>;

impl From<config::ConfigError> for EventSphereError {
    fn from(err: config::ConfigError) -> Self {
        EventSphereError::Config(err.to_string())
    }
}

/// Client-side failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// No response from the server at all
    Network,
    /// Session missing, expired or rejected
    Auth,
    /// Authenticated but not allowed
    Permission,
    /// Conflicting state on the server
    Conflict,
    /// Rejected input, client or server side
    Validation,
    NotFound,
    /// Anything else
    Server,
}

impl EventSphereError {
    /// Map an HTTP error status and server message to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            409 if is_already_present_message(&message) => EventSphereError::AlreadyPresent(message),
            409 => EventSphereError::Conflict(message),
            400 | 422 => EventSphereError::Validation(message),
            401 => EventSphereError::SessionExpired,
            403 => EventSphereError::PermissionDenied(message),
            404 => EventSphereError::NotFound(message),
            _ => EventSphereError::Api { status, message },
        }
    }

    /// Whether this is the "participant already present" conflict
    pub fn is_participant_already_present(&self) -> bool {
        matches!(self, EventSphereError::AlreadyPresent(_))
    }

    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            EventSphereError::SessionExpired => Some(401),
            EventSphereError::PermissionDenied(_) => Some(403),
            EventSphereError::NotFound(_) => Some(404),
            EventSphereError::AlreadyPresent(_) | EventSphereError::Conflict(_) => Some(409),
            EventSphereError::Api { status, .. } => Some(*status),
            EventSphereError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classify the error for reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            EventSphereError::Network(_) => ErrorCategory::Network,
            EventSphereError::Http(e) if e.is_connect() || e.is_timeout() => ErrorCategory::Network,
            EventSphereError::Http(_) => ErrorCategory::Server,
            EventSphereError::SessionExpired => ErrorCategory::Auth,
            EventSphereError::Token(_) => ErrorCategory::Auth,
            EventSphereError::PermissionDenied(_) => ErrorCategory::Permission,
            EventSphereError::NotFound(_) => ErrorCategory::NotFound,
            EventSphereError::AlreadyPresent(_) => ErrorCategory::Conflict,
            EventSphereError::Conflict(_) => ErrorCategory::Conflict,
            EventSphereError::Validation(_) => ErrorCategory::Validation,
            EventSphereError::InvalidInput(_) => ErrorCategory::Validation,
            EventSphereError::InvalidStateTransition { .. } => ErrorCategory::Validation,
            EventSphereError::Api { .. } => ErrorCategory::Server,
            EventSphereError::InvalidResponse(_) => ErrorCategory::Server,
            EventSphereError::Serialization(_) => ErrorCategory::Server,
            EventSphereError::Io(_) => ErrorCategory::Server,
            EventSphereError::UrlParse(_) => ErrorCategory::Server,
            EventSphereError::Config(_) => ErrorCategory::Server,
        }
    }

    /// Check if the error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventSphereError::Http(_) => true,
            EventSphereError::Network(_) => true,
            EventSphereError::Api { status, .. } => *status >= 500,
            EventSphereError::Io(_) => true,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventSphereError::Config(_) => ErrorSeverity::Critical,
            EventSphereError::AlreadyPresent(_) => ErrorSeverity::Info,
            EventSphereError::Validation(_) => ErrorSeverity::Info,
            EventSphereError::InvalidInput(_) => ErrorSeverity::Info,
            EventSphereError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            EventSphereError::SessionExpired => ErrorSeverity::Warning,
            EventSphereError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventSphereError::NotFound(_) => ErrorSeverity::Warning,
            EventSphereError::Conflict(_) => ErrorSeverity::Warning,
            EventSphereError::Token(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message shown to the user for this failure.
    ///
    /// Server-provided validation and conflict messages are passed through
    /// verbatim; transport failures collapse into one connection message.
    pub fn user_message(&self) -> String {
        match self {
            EventSphereError::Network(_) => messages::NETWORK_ERROR.to_string(),
            EventSphereError::Http(e) if e.is_connect() || e.is_timeout() => messages::NETWORK_ERROR.to_string(),
            EventSphereError::SessionExpired => messages::SESSION_EXPIRED.to_string(),
            EventSphereError::PermissionDenied(msg) => non_empty_or(msg, messages::PERMISSION_DENIED),
            EventSphereError::NotFound(msg) => non_empty_or(msg, messages::NOT_FOUND),
            EventSphereError::AlreadyPresent(msg) => non_empty_or(msg, messages::ALREADY_PRESENT),
            EventSphereError::Conflict(msg) => non_empty_or(msg, messages::CONFLICT),
            EventSphereError::Validation(msg) => non_empty_or(msg, messages::VALIDATION_ERROR),
            EventSphereError::InvalidInput(msg) => msg.clone(),
            EventSphereError::InvalidStateTransition { from, to } => {
                format!("Event cannot move from {} to {}", from, to)
            }
            EventSphereError::Api { message, .. } => non_empty_or(message, messages::SERVER_ERROR),
            EventSphereError::Config(msg) => format!("Configuration error: {}", msg),
            _ => messages::UNEXPECTED_ERROR.to_string(),
        }
    }
}

/// Whether a server message denotes the "already present" conflict
pub fn is_already_present_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ALREADY_PRESENT_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn non_empty_or(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

/// User-facing messages
pub mod messages {
    pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";
    pub const ACCOUNT_BLOCKED: &str = "Your account has been removed. Contact support for more information.";
    pub const AUTH_SERVICE_NOT_FOUND: &str = "Authentication service not found";
    pub const CREDENTIALS_IN_USE: &str = "Username or email already in use";
    pub const SESSION_EXPIRED: &str = "Session expired. Please log in again";
    pub const PERMISSION_DENIED: &str = "You are not allowed to perform this operation";
    pub const NOT_FOUND: &str = "Resource not found";
    pub const CONFLICT: &str = "Conflict: the resource already exists";
    pub const ALREADY_PRESENT: &str = "Participant is already present";
    pub const NETWORK_ERROR: &str = "Connection error. Check your internet connection";
    pub const SERVER_ERROR: &str = "Internal server error. Please try again";
    pub const VALIDATION_ERROR: &str = "Invalid data provided";
    pub const UNEXPECTED_ERROR: &str = "Unexpected error";
    pub const INVALID_QR: &str = "Invalid QR code. Expected a 6-digit token.";
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
