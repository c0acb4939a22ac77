//! Session guard
//!
//! Owns the reaction to authentication and connectivity failures: clearing
//! the stored session and deciding where the user is sent next.

use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::api::ApiClient;
use crate::state::navigation::{is_public_path, Navigator, LOGIN_PATH, SERVER_OFF_PATH};
use crate::state::SessionStore;
use crate::utils::errors::Result;
use crate::utils::logging::log_session_event;

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    exp: Option<i64>,
}

/// Whether the token's `exp` claim lies before `now` (unix seconds).
///
/// The signature is not checked; this only avoids a round trip for a token
/// that is certainly stale. `None` when the token carries no readable expiry.
pub fn token_expired(token: &str, now: i64) -> Option<bool> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => {
            debug!(subject = ?data.claims.sub, "Token claims read");
            data.claims.exp.map(|exp| exp <= now)
        }
        Err(e) => {
            debug!(error = %e, "Token is not a readable JWT");
            None
        }
    }
}

/// Session guard shared by the API client and the services
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    local_expiry_check: bool,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>, local_expiry_check: bool) -> Self {
        Self {
            store,
            navigator,
            local_expiry_check,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Send the user to the login screen unless already on a public page
    pub fn redirect_to_login(&self) {
        let current = self.navigator.current_path();
        if !is_public_path(&current) {
            self.navigator.redirect(LOGIN_PATH);
        }
    }

    /// React to a rejected session: clear it once, then redirect
    pub async fn handle_unauthorized(&self) {
        self.clear_session("unauthorized").await;
        self.redirect_to_login();
    }

    /// React to a request that never reached the server
    pub fn handle_network_failure(&self) {
        if self.navigator.current_path() != SERVER_OFF_PATH {
            warn!("Server unreachable, redirecting to {}", SERVER_OFF_PATH);
            self.navigator.redirect(SERVER_OFF_PATH);
        }
    }

    /// Check that the stored token is still accepted.
    ///
    /// `Ok(false)` means the session was rejected and has been cleared;
    /// redirecting is left to the caller. When the server cannot be reached
    /// the session is kept, the user is sent to the server-unavailable page
    /// and the `Network` error is returned.
    pub async fn validate_session(&self, client: &ApiClient) -> Result<bool> {
        let token = match self.store.token().await {
            Some(token) => token,
            None => return Ok(false),
        };

        if self.local_expiry_check && token_expired(&token, Utc::now().timestamp()) == Some(true) {
            debug!("Stored token has expired");
            self.clear_session("expired").await;
            return Ok(false);
        }

        match client.probe_session(&token).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.clear_session("rejected").await;
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Session validation request failed");
                self.handle_network_failure();
                Err(e)
            }
        }
    }

    /// Validate a restored session when starting on a protected path
    pub async fn startup_check(&self, client: &ApiClient) -> Result<bool> {
        if self.store.token().await.is_none() || is_public_path(&self.navigator.current_path()) {
            return Ok(true);
        }

        let valid = self.validate_session(client).await?;
        if !valid {
            self.redirect_to_login();
        }
        Ok(valid)
    }

    async fn clear_session(&self, reason: &str) {
        log_session_event(reason, None);
        if let Err(e) = self.store.clear().await {
            error!(error = %e, "Failed to clear session");
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("current_path", &self.navigator.current_path())
            .field("local_expiry_check", &self.local_expiry_check)
            .finish()
    }
}
