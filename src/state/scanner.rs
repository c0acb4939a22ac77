//! Attendance scanner
//!
//! Decoded QR text arrives from an external decoder. The scanner
//! normalizes it to a presence token, submits it once, and then holds a
//! cooldown so a code that stays in frame is not submitted again.
//!
//! Time is always passed in by the caller, so the state machine can be
//! driven deterministically.

use async_trait::async_trait;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::ScannerConfig;
use crate::models::{ParticipantId, PresenceRecord};
use crate::services::ServiceResponse;
use crate::utils::errors::{messages, Result};
use crate::utils::logging::log_scan_result;

/// Number of digits in a presence token
pub const TOKEN_LENGTH: usize = 6;

/// A validated six-digit presence token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresenceToken(String);

impl PresenceToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a presence token from decoded text.
///
/// Non-digits are dropped and, when more than six digits remain, only the
/// last six are kept. Anything shorter is rejected; tokens are never padded.
pub fn normalize_token(raw: &str) -> Option<PresenceToken> {
    let digits: Vec<char> = raw.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.len() < TOKEN_LENGTH {
        return None;
    }
    let token: String = digits[digits.len() - TOKEN_LENGTH..].iter().collect();
    Some(PresenceToken(token))
}

/// Marks a participant present from a token
#[async_trait]
pub trait PresenceMarker: Send + Sync {
    /// `Err(AlreadyPresent)` is the benign "already checked in" case
    async fn mark_presence(&self, token: &PresenceToken) -> Result<ServiceResponse<PresenceRecord>>;
}

/// Result of handling one decode
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Marked(PresenceRecord),
    /// The participant was already scanned in this session
    Duplicate(PresenceRecord),
    /// The server reports the participant as present already
    AlreadyPresent(String),
    InvalidToken,
    Failed(String),
}

impl ScanOutcome {
    pub fn message(&self) -> String {
        match self {
            ScanOutcome::Marked(record) => format!("Presence confirmed: {}", record.display_name()),
            ScanOutcome::Duplicate(_) => "Participant was already scanned".to_string(),
            ScanOutcome::AlreadyPresent(_) => messages::ALREADY_PRESENT.to_string(),
            ScanOutcome::InvalidToken => messages::INVALID_QR.to_string(),
            ScanOutcome::Failed(message) => message.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Marked(_))
    }

    fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Marked(_) => "marked",
            ScanOutcome::Duplicate(_) => "duplicate",
            ScanOutcome::AlreadyPresent(_) => "already_present",
            ScanOutcome::InvalidToken => "invalid_token",
            ScanOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScannerState {
    Idle,
    Scanning,
    /// A mark-presence request is in flight
    Processing,
    /// Decodes are ignored until `until`
    Cooldown { until: Instant, outcome: ScanOutcome },
}

/// Presence scanning session for one event
pub struct AttendanceScanner<M: PresenceMarker> {
    marker: M,
    state: ScannerState,
    scanned: Vec<PresenceRecord>,
    scan_pause: Duration,
    success_display: Duration,
}

impl<M: PresenceMarker> AttendanceScanner<M> {
    pub fn new(marker: M, config: &ScannerConfig) -> Self {
        Self {
            marker,
            state: ScannerState::Idle,
            scanned: Vec::new(),
            scan_pause: Duration::from_millis(config.scan_pause_ms),
            success_display: Duration::from_millis(config.success_display_ms),
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Participants scanned so far, newest first
    pub fn scanned(&self) -> &[PresenceRecord] {
        &self.scanned
    }

    /// Seed the list with participants already present
    pub fn preload(&mut self, records: Vec<PresenceRecord>) {
        self.scanned = records;
    }

    pub fn start(&mut self) {
        if self.state == ScannerState::Idle {
            self.state = ScannerState::Scanning;
        }
    }

    pub fn stop(&mut self) {
        self.state = ScannerState::Idle;
    }

    /// Resume scanning once the cooldown has elapsed
    pub fn tick(&mut self, now: Instant) {
        if let ScannerState::Cooldown { until, .. } = &self.state {
            if now >= *until {
                self.state = ScannerState::Scanning;
            }
        }
    }

    /// Handle decoded text; ignored unless the scanner is actively scanning
    pub async fn on_decoded(&mut self, raw: &str, now: Instant) -> Option<ScanOutcome> {
        self.tick(now);
        if self.state != ScannerState::Scanning {
            debug!(state = ?self.state, "Decode ignored");
            return None;
        }
        Some(self.process(raw, now).await)
    }

    /// Handle a token typed in by hand; accepted in any state but `Processing`
    pub async fn submit_manual(&mut self, raw: &str, now: Instant) -> Option<ScanOutcome> {
        if self.state == ScannerState::Processing {
            return None;
        }
        let resume = self.state != ScannerState::Idle;
        let outcome = self.process(raw, now).await;
        if !resume {
            self.state = ScannerState::Idle;
        }
        Some(outcome)
    }

    async fn process(&mut self, raw: &str, now: Instant) -> ScanOutcome {
        let outcome = match normalize_token(raw) {
            Some(token) => {
                self.state = ScannerState::Processing;
                let outcome = self.submit(&token).await;
                log_scan_result(token.as_str(), outcome.label());
                outcome
            }
            None => {
                log_scan_result(raw.trim(), ScanOutcome::InvalidToken.label());
                ScanOutcome::InvalidToken
            }
        };

        let pause = match outcome {
            ScanOutcome::InvalidToken | ScanOutcome::Failed(_) => self.scan_pause,
            _ => self.success_display,
        };
        self.state = ScannerState::Cooldown {
            until: now + pause,
            outcome: outcome.clone(),
        };
        outcome
    }

    async fn submit(&mut self, token: &PresenceToken) -> ScanOutcome {
        match self.marker.mark_presence(token).await {
            Ok(ServiceResponse::Success { data, .. }) => self.record(data),
            Ok(ServiceResponse::Failure(failure)) => ScanOutcome::Failed(failure.message),
            Err(e) if e.is_participant_already_present() => ScanOutcome::AlreadyPresent(e.user_message()),
            Err(e) => {
                warn!(error = %e, "Mark presence failed");
                ScanOutcome::Failed(e.user_message())
            }
        }
    }

    fn record(&mut self, record: PresenceRecord) -> ScanOutcome {
        if is_listed(&self.scanned, record.id) {
            return ScanOutcome::Duplicate(record);
        }
        self.scanned.insert(0, record.clone());
        ScanOutcome::Marked(record)
    }
}

fn is_listed(scanned: &[PresenceRecord], id: Option<ParticipantId>) -> bool {
    id.map_or(false, |id| scanned.iter().any(|r| r.id == Some(id)))
}
