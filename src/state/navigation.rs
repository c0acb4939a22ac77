//! Navigation seam
//!
//! The client never drives a UI directly. Redirect decisions (back to the
//! login screen, to the server-unavailable notice) go through a
//! [`Navigator`] supplied by the embedder.

use std::sync::Mutex;
use tracing::info;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";
pub const SERVER_OFF_PATH: &str = "/server-off";

/// Paths reachable without a session
pub const PUBLIC_PATHS: [&str; 3] = [LOGIN_PATH, REGISTER_PATH, HOME_PATH];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn redirect(&self, path: &str);
}

/// Navigator that records redirects instead of performing them
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavigationHistory>,
}

#[derive(Debug, Default)]
struct NavigationHistory {
    current: String,
    redirects: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(start_path: &str) -> Self {
        Self {
            inner: Mutex::new(NavigationHistory {
                current: start_path.to_string(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Every redirect so far, oldest first
    pub fn redirects(&self) -> Vec<String> {
        self.lock().redirects.clone()
    }

    /// Move to a path without recording it as a redirect
    pub fn visit(&self, path: &str) {
        self.lock().current = path.to_string();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigationHistory> {
        // Poisoning only happens if a holder panicked; the history is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn redirect(&self, path: &str) {
        let mut history = self.lock();
        history.current = path.to_string();
        history.redirects.push(path.to_string());
    }
}

/// Navigator for the command line: redirects become hints on stderr
#[derive(Debug)]
pub struct ConsoleNavigator {
    inner: MemoryNavigator,
}

impl ConsoleNavigator {
    pub fn new(command_path: &str) -> Self {
        Self {
            inner: MemoryNavigator::new(command_path),
        }
    }

    pub fn hint_for(path: &str) -> Option<&'static str> {
        match path {
            LOGIN_PATH => Some("Session expired or missing. Run `eventsphere login` to sign in again."),
            SERVER_OFF_PATH => Some("The EventSphere server is unavailable. Try again later."),
            _ => None,
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.inner.current_path()
    }

    fn redirect(&self, path: &str) {
        info!(path = path, "Redirect requested");
        if let Some(hint) = Self::hint_for(path) {
            eprintln!("{}", hint);
        }
        self.inner.redirect(path);
    }
}
