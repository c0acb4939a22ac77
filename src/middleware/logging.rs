//! Request logging middleware
//!
//! This module times API requests and reports their outcome through
//! `tracing`, at a level chosen from the error severity.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Span};

use crate::utils::errors::{ErrorSeverity, EventSphereError};
use crate::utils::logging::log_api_call;

/// Requests slower than this are reported at `warn`
const SLOW_REQUEST: Duration = Duration::from_secs(2);

/// Logging middleware for API requests
#[derive(Debug, Clone)]
pub struct RequestLogger {
    log_requests: bool,
    log_errors: bool,
}

impl RequestLogger {
    pub fn new(log_requests: bool, log_errors: bool) -> Self {
        Self {
            log_requests,
            log_errors,
        }
    }

    /// Start timing a request
    pub fn start(&self, method: &str, path: &str) -> RequestTracker {
        RequestTracker {
            logger: self.clone(),
            method: method.to_string(),
            path: path.to_string(),
            start_time: Instant::now(),
            _span: tracing::debug_span!("api_request", method = %method, path = %path),
        }
    }

    /// Log a failed request at the level its severity calls for
    pub fn log_failure(&self, method: &str, path: &str, err: &EventSphereError, elapsed: Duration) {
        if !self.log_errors {
            return;
        }

        let duration_ms = elapsed.as_millis() as u64;
        let status = err.status();
        match err.severity() {
            ErrorSeverity::Info => info!(
                method = method,
                path = path,
                status = status,
                duration_ms = duration_ms,
                reason = %err,
                "API request not accepted"
            ),
            ErrorSeverity::Warning => warn!(
                method = method,
                path = path,
                status = status,
                duration_ms = duration_ms,
                error = %err,
                "API request rejected"
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => error!(
                method = method,
                path = path,
                status = status,
                duration_ms = duration_ms,
                error = %err,
                "API request failed"
            ),
        }
    }

    fn log_success(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        if !self.log_requests {
            return;
        }

        log_api_call(method, path, Some(status), elapsed);
        if elapsed > SLOW_REQUEST {
            warn!(
                method = method,
                path = path,
                duration_ms = elapsed.as_millis() as u64,
                "Slow API request"
            );
        }
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Timer for a single request
pub struct RequestTracker {
    logger: RequestLogger,
    method: String,
    path: String,
    start_time: Instant,
    _span: Span,
}

impl RequestTracker {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Complete tracking with the HTTP status received
    pub fn success(self, status: u16) {
        self.logger.log_success(&self.method, &self.path, status, self.elapsed());
    }

    /// Complete tracking with the error the request produced
    pub fn failure(self, err: &EventSphereError) {
        self.logger.log_failure(&self.method, &self.path, err, self.elapsed());
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        debug!(
            method = %self.method,
            path = %self.path,
            duration_ms = self.start_time.elapsed().as_millis() as u64,
            "Request tracker dropped"
        );
    }
}
