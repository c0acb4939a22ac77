//! State management module
//!
//! This module handles the client session, navigation decisions and the
//! attendance scanner state machine

pub mod navigation;
pub mod scanner;
pub mod session;

// Re-export commonly used state components
pub use navigation::{ConsoleNavigator, MemoryNavigator, Navigator, PUBLIC_PATHS};
pub use scanner::{normalize_token, AttendanceScanner, PresenceMarker, PresenceToken, ScanOutcome, ScannerState};
pub use session::{
    changes, FileSessionStore, MemorySessionStore, SessionEvent, SessionSnapshot, SessionStore, SessionWatcher,
};
