//! Services module
//!
//! This module contains the domain services the view layer calls. Every
//! public operation returns a [`ServiceResponse`], so callers never have to
//! handle raw errors.

pub mod access;
pub mod auth;
pub mod event;
pub mod participant;
pub mod user;

pub use access::{available_actions, current_user_id, derive_access, AccessRole, EventAccess, EventAction};
pub use auth::AuthService;
pub use event::{Dashboard, EventService};
pub use participant::ParticipantService;
pub use user::UserService;

use reqwest::multipart::Part;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{ApiClient, Endpoint, Params};
use crate::config::Settings;
use crate::middleware::SessionGuard;
use crate::state::{Navigator, SessionStore};
use crate::utils::errors::{ErrorCategory, EventSphereError, Result};
use crate::utils::helpers::{format_bytes, image_mime_type};
use crate::utils::logging::log_api_error;
use crate::utils::validators::{format_validation_errors, validate_file};

/// Uniform result of a service operation
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse<T> {
    Success { data: T, message: Option<String> },
    Failure(ServiceFailure),
}

impl<T> ServiceResponse<T> {
    pub fn success(data: T) -> Self {
        ServiceResponse::Success { data, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ServiceResponse::Success {
            data,
            message: Some(message.into()),
        }
    }

    pub fn failure(category: ErrorCategory, message: impl Into<String>) -> Self {
        ServiceResponse::Failure(ServiceFailure {
            category,
            message: message.into(),
            should_redirect: false,
        })
    }

    /// Validation failure raised before any request was sent
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::failure(ErrorCategory::Validation, message)
    }

    pub fn from_error(err: &EventSphereError, context: &str) -> Self {
        ServiceResponse::Failure(ServiceFailure::from_error(err, context))
    }

    /// Convert a service result, normalizing the error
    pub fn from_result(result: Result<Self>, context: &str) -> Self {
        result.unwrap_or_else(|e| Self::from_error(&e, context))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ServiceResponse::Success { data, .. } => Some(data),
            ServiceResponse::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ServiceResponse::Success { data, .. } => Some(data),
            ServiceResponse::Failure(_) => None,
        }
    }

    /// Success message, or the failure message
    pub fn message(&self) -> Option<&str> {
        match self {
            ServiceResponse::Success { message, .. } => message.as_deref(),
            ServiceResponse::Failure(failure) => Some(&failure.message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        match self {
            ServiceResponse::Success { data, message } => ServiceResponse::Success { data: f(data), message },
            ServiceResponse::Failure(failure) => ServiceResponse::Failure(failure),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, ServiceFailure> {
        match self {
            ServiceResponse::Success { data, .. } => Ok(data),
            ServiceResponse::Failure(failure) => Err(failure),
        }
    }
}

/// Failure reported to the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub category: ErrorCategory,
    /// User-facing message
    pub message: String,
    /// The session was rejected and the user is being sent to login
    pub should_redirect: bool,
}

impl ServiceFailure {
    /// Normalize an error; the "already present" conflict is not logged
    pub fn from_error(err: &EventSphereError, context: &str) -> Self {
        if !err.is_participant_already_present() {
            log_api_error(context, &err.to_string(), err.status());
        }

        let category = err.category();
        Self {
            category,
            message: err.user_message(),
            should_redirect: category == ErrorCategory::Auth,
        }
    }
}

impl std::fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read an image from disk as a multipart part, checking size and type first
pub(crate) async fn image_part(path: &Path) -> Result<Part> {
    let metadata = tokio::fs::metadata(path).await?;
    let mime = image_mime_type(path);
    let errors = validate_file(metadata.len(), mime);
    if !errors.is_empty() {
        return Err(EventSphereError::Validation(format_validation_errors(&errors)));
    }

    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    debug!(file = %file_name, size = %format_bytes(metadata.len()), "Image prepared for upload");

    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.unwrap_or("application/octet-stream"))?;
    Ok(part)
}

/// Service factory for creating and wiring all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub client: ApiClient,
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub participant_service: ParticipantService,
    pub user_service: UserService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let guard = Arc::new(SessionGuard::new(
            store,
            navigator,
            settings.features.local_expiry_check,
        ));
        let client = ApiClient::new(&settings.api, guard, settings.features.eager_token_validation)?;

        let auth_service = AuthService::new(client.clone());
        let event_service = EventService::new(client.clone());
        let participant_service = ParticipantService::new(client.clone());
        let user_service = UserService::new(client.clone(), auth_service.clone());

        info!(base_url = client.base_url(), "Services initialized");

        Ok(Self {
            client,
            auth_service,
            event_service,
            participant_service,
            user_service,
        })
    }

    pub fn guard(&self) -> &Arc<SessionGuard> {
        self.client.guard()
    }

    /// Check that a restored session is still valid; `Err` when the server is unreachable
    pub async fn startup_check(&self) -> Result<bool> {
        self.client.guard().startup_check(&self.client).await
    }

    /// Health check of the backend and the local session
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let (backend_healthy, backend_status) = match self.client.get(Endpoint::Health, &Params::new()).await {
            Ok(response) => {
                let status = response
                    .data()
                    .and_then(|d| d.get("status"))
                    .and_then(|s| s.as_str())
                    .map(str::to_string);
                (response.success(), status)
            }
            Err(_) => (false, None),
        };

        ServiceHealthStatus {
            backend_healthy,
            backend_status,
            authenticated: self.auth_service.is_authenticated().await,
        }
    }
}

/// Health status of the client's dependencies
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceHealthStatus {
    pub backend_healthy: bool,
    /// Status string the backend reported, e.g. "UP"
    pub backend_status: Option<String>,
    pub authenticated: bool,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.backend_healthy
    }

    /// Get list of problems
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.backend_healthy {
            issues.push("Backend is not reachable".to_string());
        }
        if !self.authenticated {
            issues.push("Not logged in".to_string());
        }

        issues
    }
}
