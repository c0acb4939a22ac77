//! Mock EventSphere API server for testing
//!
//! This module provides a mock HTTP server that simulates the EventSphere
//! backend. It uses wiremock to create configurable mock responses.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

/// Mock EventSphere API server
pub struct ApiMockServer {
    pub server: MockServer,
}

impl ApiMockServer {
    /// Start a new mock server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Respond to `verb path` with a JSON body
    pub async fn mock_json(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Like [`mock_json`](Self::mock_json), but the mock must be hit exactly `times`
    pub async fn expect_json(&self, verb: &str, route: &str, status: u16, body: Value, times: u64) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Wrap `data` in the usual `{success, message, data}` envelope
    pub async fn mock_envelope(&self, verb: &str, route: &str, data: Value) {
        self.mock_json(verb, route, 200, envelope(data)).await;
    }

    pub async fn mock_login(&self, token: &str) {
        self.mock_json("POST", "/login/accept", 200, json!({ "token": token }))
            .await;
    }

    pub async fn mock_profile(&self, user: Value) {
        self.mock_envelope("GET", "/api/user/get", user).await;
    }

    pub async fn mock_unauthorized(&self, verb: &str, route: &str) {
        self.mock_json(verb, route, 401, json!({ "message": "Token expired" }))
            .await;
    }

    /// Every request the server has seen
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests seen for one path
    pub async fn requests_to(&self, route: &str) -> Vec<Request> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == route)
            .collect()
    }

    pub async fn reset(&self) {
        self.server.reset().await;
    }
}

/// Standard success envelope
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "message": null, "data": data })
}
