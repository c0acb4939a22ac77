//! Authentication service implementation
//!
//! This service handles login, registration, logout and the user record
//! kept in the session.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ServiceResponse;
use crate::api::{ApiClient, Endpoint, Params};
use crate::models::{LoginRequest, RegisterRequest, StoredUser, TokenResponse, User, UserPatch};
use crate::state::navigation::LOGIN_PATH;
use crate::state::SessionStore;
use crate::utils::errors::{messages, ErrorCategory, EventSphereError};
use crate::utils::logging::log_session_event;
use crate::utils::validators::{format_validation_errors, validate_registration};

const BLOCKED_MARKERS: [&str; 3] = ["blocked", "bloqueada", "bloqueado"];

/// Authentication service for managing the client session
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn store(&self) -> &Arc<dyn SessionStore> {
        self.client.guard().store()
    }

    /// Log in and store the session token
    pub async fn login(&self, credentials: &LoginRequest) -> ServiceResponse<StoredUser> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return ServiceResponse::invalid("Username and password are required");
        }

        debug!(username = %credentials.username, "Attempting login");
        let response = match self.client.post(Endpoint::Login, &Params::new(), credentials).await {
            Ok(response) => response,
            Err(e) => return login_failure(&e),
        };

        let token = if response.success() {
            response
                .data_as::<TokenResponse>()
                .ok()
                .or_else(|| serde_json::from_value::<TokenResponse>(response.body.clone()).ok())
                .and_then(TokenResponse::into_token)
        } else {
            None
        };

        let token = match token {
            Some(token) => token,
            None => {
                return ServiceResponse::failure(ErrorCategory::Auth, response.message_or("Invalid credentials"));
            }
        };

        let user = StoredUser::with_username(credentials.username.trim());
        let stored = async {
            self.store().set_token(&token).await?;
            self.store().set_user(&user).await
        };
        if let Err(e) = stored.await {
            return ServiceResponse::from_error(&e, "login");
        }

        log_session_event("login", user.username.as_deref());
        ServiceResponse::success(user)
    }

    /// Register a new account
    pub async fn register(&self, data: &RegisterRequest) -> ServiceResponse<()> {
        let errors = validate_registration(data);
        if !errors.is_empty() {
            return ServiceResponse::invalid(format_validation_errors(&errors));
        }

        match self.client.post(Endpoint::Register, &Params::new(), data).await {
            Ok(response) if response.success() => {
                info!(username = %data.username, "Account registered");
                ServiceResponse::with_message((), response.message_or("Account registered"))
            }
            Ok(response) => ServiceResponse::failure(ErrorCategory::Validation, response.message_or("Registration failed")),
            Err(EventSphereError::Conflict(_)) => {
                ServiceResponse::failure(ErrorCategory::Conflict, messages::CREDENTIALS_IN_USE)
            }
            Err(e) => ServiceResponse::from_error(&e, "register"),
        }
    }

    /// Clear the session and go to the login screen
    pub async fn logout(&self) -> ServiceResponse<()> {
        let username = self.current_user().await.and_then(|u| u.username);
        if let Err(e) = self.store().clear().await {
            return ServiceResponse::from_error(&e, "logout");
        }
        log_session_event("logout", username.as_deref());
        self.client.guard().navigator().redirect(LOGIN_PATH);
        ServiceResponse::success(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store().token().await.is_some()
    }

    pub async fn current_user(&self) -> Option<StoredUser> {
        self.store().user().await
    }

    pub async fn token(&self) -> Option<String> {
        self.store().token().await
    }

    /// Merge `patch` into the session user.
    ///
    /// The photo is dropped before persisting but kept in the returned user.
    pub async fn update_current_user(&self, patch: &UserPatch) -> ServiceResponse<User> {
        let current = match self.current_user().await {
            Some(user) => user,
            None => {
                warn!("No user in session to update");
                return ServiceResponse::failure(ErrorCategory::Auth, "No user in the current session");
            }
        };

        let merged = current.merge(patch);
        match self.store().set_user(&merged.to_stored()).await {
            Ok(()) => ServiceResponse::success(merged),
            Err(e) => ServiceResponse::from_error(&e, "update_current_user"),
        }
    }
}

/// Map a failed login to the message shown to the user
fn login_failure(err: &EventSphereError) -> ServiceResponse<StoredUser> {
    let text = err.to_string().to_lowercase();
    let blocked = BLOCKED_MARKERS.iter().any(|m| text.contains(m));

    let (category, message) = match err.status() {
        Some(404) => (ErrorCategory::NotFound, messages::AUTH_SERVICE_NOT_FOUND.to_string()),
        Some(401) => (ErrorCategory::Auth, messages::INVALID_CREDENTIALS.to_string()),
        _ if blocked => (ErrorCategory::Permission, messages::ACCOUNT_BLOCKED.to_string()),
        Some(403) => (ErrorCategory::Permission, messages::ACCOUNT_BLOCKED.to_string()),
        Some(status) if status >= 500 => (ErrorCategory::Server, messages::SERVER_ERROR.to_string()),
        _ => (err.category(), err.user_message()),
    };

    if category == ErrorCategory::Server || category == ErrorCategory::Network {
        warn!(error = %err, "Login request failed");
    }
    ServiceResponse::failure(category, message)
}
