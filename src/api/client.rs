//! HTTP client for the EventSphere API
//!
//! Every request goes through [`ApiClient::request`], which attaches the
//! session token and turns HTTP failures into [`EventSphereError`] values.
//! Session-level consequences (clearing the session after a 401, the
//! server-unavailable redirect) are delegated to the [`SessionGuard`].

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::endpoints::{build_url, Endpoint, Params};
use crate::config::ApiConfig;
use crate::middleware::{RequestLogger, SessionGuard};
use crate::models::ApiResponse;
use crate::utils::errors::{EventSphereError, Result};

const JSON: &str = "application/json";

/// Per-request behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Re-validate the session before sending
    pub validate_token: bool,
}

impl RequestOptions {
    pub fn validated() -> Self {
        Self { validate_token: true }
    }
}

/// API client shared by all services
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    upload_timeout: Duration,
    eager_validation: bool,
    guard: Arc<SessionGuard>,
    logger: RequestLogger,
}

impl ApiClient {
    /// Create a new client for the configured API
    pub fn new(config: &ApiConfig, guard: Arc<SessionGuard>, eager_validation: bool) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(EventSphereError::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: Duration::from_secs(config.upload_timeout_seconds),
            eager_validation,
            guard,
            logger: RequestLogger::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn guard(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    pub fn url(&self, endpoint: Endpoint, params: &Params) -> Result<Url> {
        build_url(&self.base_url, endpoint, params)
    }

    pub async fn get(&self, endpoint: Endpoint, params: &Params) -> Result<ApiResponse> {
        self.request(Method::GET, endpoint, params, None, RequestOptions::default())
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: Endpoint, params: &Params, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, params, Some(body), self.mutation_options())
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: Endpoint, params: &Params, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, params, Some(body), self.mutation_options())
            .await
    }

    /// PUT without a body, for action endpoints
    pub async fn put_empty(&self, endpoint: Endpoint, params: &Params) -> Result<ApiResponse> {
        self.request(Method::PUT, endpoint, params, None, self.mutation_options())
            .await
    }

    pub async fn delete(&self, endpoint: Endpoint, params: &Params) -> Result<ApiResponse> {
        self.request(Method::DELETE, endpoint, params, None, self.mutation_options())
            .await
    }

    fn mutation_options(&self) -> RequestOptions {
        RequestOptions {
            validate_token: self.eager_validation,
        }
    }

    /// Send a JSON request
    pub async fn request(
        &self,
        method: Method,
        endpoint: Endpoint,
        params: &Params,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let url = self.url(endpoint, params)?;
        let token = self.guard.store().token().await;

        if options.validate_token && token.is_some() && !endpoint.is_auth() {
            self.ensure_session().await?;
        }

        let tracker = self.logger.start(method.as_str(), url.path());
        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let result = match request.send().await {
            Ok(response) => self.handle_response(endpoint, response).await,
            Err(e) => Err(self.transport_error(e)),
        };

        match &result {
            Ok(response) => tracker.success(response.status),
            Err(e) => tracker.failure(e),
        }
        result
    }

    /// Send a multipart upload.
    ///
    /// The session is always re-validated first, and the request is bounded
    /// by the upload timeout.
    pub async fn upload(&self, endpoint: Endpoint, params: &Params, form: Form) -> Result<ApiResponse> {
        let url = self.url(endpoint, params)?;
        let token = self.guard.store().token().await;
        if token.is_some() {
            self.ensure_session().await?;
        }

        let tracker = self.logger.start("POST", url.path());
        let mut request = self.http.post(url).timeout(self.upload_timeout).multipart(form);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }

        let result = match request.send().await {
            Ok(response) => self.handle_upload_response(response).await,
            Err(e) if e.is_timeout() => Err(EventSphereError::Network(format!(
                "upload timed out after {}s",
                self.upload_timeout.as_secs()
            ))),
            Err(e) if e.is_builder() => Err(EventSphereError::Http(e)),
            Err(e) => Err(EventSphereError::Network(e.to_string())),
        };

        match &result {
            Ok(response) => tracker.success(response.status),
            Err(e) => tracker.failure(e),
        }
        result
    }

    /// Whether the server accepts `token`; used by the session guard.
    ///
    /// Any answer other than 2xx is a rejection. A request that never reached
    /// the server is a `Network` error.
    pub async fn probe_session(&self, token: &str) -> Result<bool> {
        let url = self.url(Endpoint::UserProfile, &Params::new())?;
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, JSON)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| EventSphereError::Network(e.to_string()))?;
        debug!(status = response.status().as_u16(), "Session probe answered");
        Ok(response.status().is_success())
    }

    async fn ensure_session(&self) -> Result<()> {
        if self.guard.validate_session(self).await? {
            Ok(())
        } else {
            self.guard.redirect_to_login();
            Err(EventSphereError::SessionExpired)
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> EventSphereError {
        if e.is_builder() {
            return EventSphereError::Http(e);
        }
        self.guard.handle_network_failure();
        EventSphereError::Network(e.to_string())
    }

    async fn handle_response(&self, endpoint: Endpoint, response: Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();

        if status == 401 && !endpoint.is_auth() {
            self.guard.handle_unauthorized().await;
            return Err(EventSphereError::SessionExpired);
        }

        let body = read_body(response).await?;
        if !(200..300).contains(&status) {
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            if status == 401 {
                // Rejected credentials on login or registration
                return Err(EventSphereError::Api { status, message });
            }
            return Err(EventSphereError::from_status(status, message));
        }

        Ok(ApiResponse::new(status, body))
    }

    async fn handle_upload_response(&self, response: Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();

        if status == 401 {
            self.guard.handle_unauthorized().await;
            return Err(EventSphereError::SessionExpired);
        }

        let body = read_body(response).await?;
        if !(200..300).contains(&status) {
            let message = error_message(&body).unwrap_or_else(|| format!("Upload failed ({})", status));
            return Err(EventSphereError::from_status(status, message));
        }

        Ok(ApiResponse::new(status, body))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("upload_timeout", &self.upload_timeout)
            .field("eager_validation", &self.eager_validation)
            .finish()
    }
}

/// Decode a body as JSON; an empty body is `Null` and non-JSON text is kept as a string
async fn read_body(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}

fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
