//! Session integration tests
//!
//! Login, registration, logout and the reaction to rejected or missing
//! sessions.

use assert_matches::assert_matches;
use eventsphere::models::{LoginRequest, RegisterRequest, StoredUser};
use eventsphere::state::{FileSessionStore, SessionEvent, SessionStore};
use eventsphere::utils::errors::{messages, ErrorCategory, EventSphereError};
use eventsphere::ServiceResponse;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::*;
use crate::integration::logged_in_context;

fn credentials(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: "Secret1!".to_string(),
    }
}

#[tokio::test]
async fn test_login_stores_token_and_user() {
    let ctx = TestContext::new_with_config(TestConfig {
        start_path: "/login".to_string(),
        ..Default::default()
    })
    .await;
    ctx.mock.mock_login("fresh-token").await;

    let response = ctx.services.auth_service.login(&credentials(" ana ")).await;

    let user = response.into_data().expect("login should succeed");
    assert_eq!(user.username.as_deref(), Some("ana"));
    assert_eq!(ctx.store.token().await.as_deref(), Some("fresh-token"));
    assert_eq!(ctx.store.user().await, Some(StoredUser::with_username("ana")));

    let sent = ctx.mock.requests_to("/login/accept").await;
    assert_eq!(sent.len(), 1);
    let body: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(body, json!({ "username": " ana ", "password": "Secret1!" }));
    assert!(sent[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_reads_token_nested_in_data() {
    let ctx = TestContext::new().await;
    ctx.mock
        .mock_json("POST", "/login/accept", 200, json!({ "success": true, "data": { "token": "nested" } }))
        .await;

    assert!(ctx.services.auth_service.login(&credentials("ana")).await.is_success());
    assert_eq!(ctx.store.token().await.as_deref(), Some("nested"));
}

#[tokio::test]
async fn test_rejected_login_is_not_a_session_expiry() {
    let ctx = TestContext::new_with_config(TestConfig {
        start_path: "/login".to_string(),
        ..Default::default()
    })
    .await;
    ctx.mock
        .mock_json("POST", "/login/accept", 401, json!({ "message": "Bad credentials" }))
        .await;

    let response = ctx.services.auth_service.login(&credentials("ana")).await;

    assert_eq!(response.message(), Some(messages::INVALID_CREDENTIALS));
    assert!(ctx.redirects().is_empty());
    assert!(ctx.store.token().await.is_none());
}

#[tokio::test]
async fn test_blocked_account_message() {
    let ctx = TestContext::new().await;
    ctx.mock
        .mock_json("POST", "/login/accept", 403, json!({ "message": "Conta bloqueada" }))
        .await;

    let response = ctx.services.auth_service.login(&credentials("ana")).await;
    assert_eq!(response.message(), Some(messages::ACCOUNT_BLOCKED));
}

#[tokio::test]
async fn test_register_conflict_reports_credentials_in_use() {
    let ctx = TestContext::new().await;
    ctx.mock
        .mock_json("POST", "/register/accept", 409, json!({ "message": "duplicate key" }))
        .await;

    let request = RegisterRequest {
        name: "Ana Souza".to_string(),
        username: "ana".to_string(),
        email: "ana@example.com".to_string(),
        password: "Str0ng!Pass".to_string(),
    };
    let response = ctx.services.auth_service.register(&request).await;

    let failure = response.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Conflict);
    assert_eq!(failure.message, messages::CREDENTIALS_IN_USE);
}

#[tokio::test]
async fn test_register_validates_before_sending() {
    let ctx = TestContext::new().await;

    let request = RegisterRequest {
        name: "Ana".to_string(),
        username: "ana".to_string(),
        email: "not-an-email".to_string(),
        password: "weak".to_string(),
    };
    let response = ctx.services.auth_service.register(&request).await;

    assert_matches!(response, ServiceResponse::Failure(ref f) if f.category == ErrorCategory::Validation);
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_session_once_and_redirects() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock.mock_unauthorized("GET", "/api/event/my").await;
    let mut events = ctx.store.subscribe();

    let response = ctx.services.event_service.my_events().await;

    let failure = response.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Auth);
    assert!(failure.should_redirect);
    assert_eq!(failure.message, messages::SESSION_EXPIRED);

    assert_matches!(events.try_recv(), Ok(SessionEvent::Cleared));
    assert!(events.try_recv().is_err());
    assert_eq!(ctx.redirects(), vec!["/login".to_string()]);
    assert!(ctx.store.token().await.is_none());
    assert!(ctx.store.user().await.is_none());
}

#[tokio::test]
async fn test_unreachable_server_redirects_to_server_off() {
    let ctx = TestContext::new_with_config(TestConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        ..TestConfig::logged_in(OWNER_ID)
    })
    .await;

    let response = ctx.services.event_service.public_events().await;

    let failure = response.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Network);
    assert!(!failure.should_redirect);
    assert_eq!(ctx.redirects(), vec!["/server-off".to_string()]);
    // The session survives a network failure
    assert!(ctx.store.token().await.is_some());
}

#[tokio::test]
async fn test_unreachable_server_during_validation_keeps_session() {
    let ctx = TestContext::new_with_config(TestConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        token: Some(jwt_expiring_in(3600)),
        eager_validation: true,
        ..Default::default()
    })
    .await;
    let mut events = ctx.store.subscribe();

    let response = ctx.services.event_service.delete_event(10.into()).await;

    let failure = response.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Network);
    assert_eq!(failure.message, messages::NETWORK_ERROR);
    assert!(!failure.should_redirect);
    assert_eq!(ctx.redirects(), vec!["/server-off".to_string()]);
    assert!(ctx.store.token().await.is_some());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_startup_check_keeps_session_when_server_is_down() {
    let ctx = TestContext::new_with_config(TestConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        ..TestConfig::logged_in(OWNER_ID)
    })
    .await;

    let result = ctx.services.startup_check().await;

    assert_matches!(result, Err(EventSphereError::Network(_)));
    assert!(result.unwrap_err().is_recoverable());
    assert!(ctx.store.token().await.is_some());
    assert_eq!(ctx.redirects(), vec!["/server-off".to_string()]);
}

#[tokio::test]
async fn test_expired_token_blocks_mutation_without_request() {
    let ctx = TestContext::new_with_config(TestConfig {
        token: Some(jwt_expiring_in(-60)),
        eager_validation: true,
        ..Default::default()
    })
    .await;

    let response = ctx.services.event_service.delete_event(10.into()).await;

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::Auth);
    assert!(ctx.mock.requests().await.is_empty());
    assert!(ctx.store.token().await.is_none());
    assert_eq!(ctx.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_eager_validation_probes_the_profile_first() {
    let ctx = TestContext::new_with_config(TestConfig {
        token: Some(jwt_expiring_in(3600)),
        eager_validation: true,
        ..Default::default()
    })
    .await;
    ctx.mock.mock_profile(user_json(OWNER_ID, "ana")).await;
    ctx.mock
        .expect_json("DELETE", "/api/event/10", 200, json!({ "success": true, "message": "Removed" }), 1)
        .await;

    let response = ctx.services.event_service.delete_event(10.into()).await;

    assert_eq!(response.message(), Some("Removed"));
    assert_eq!(ctx.mock.requests_to("/api/user/get").await.len(), 1);
}

#[tokio::test]
async fn test_startup_check_clears_rejected_session() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock.mock_unauthorized("GET", "/api/user/get").await;

    assert!(!ctx.services.startup_check().await.unwrap());
    assert!(ctx.store.token().await.is_none());
    assert_eq!(ctx.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_profile_sync_drops_the_photo() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock.mock_profile(user_json(OWNER_ID, "ana")).await;

    let user = ctx
        .services
        .user_service
        .fetch_profile_and_sync()
        .await
        .into_data()
        .expect("profile should load");

    assert!(user.photo.is_some());
    let stored = ctx.store.user().await.unwrap();
    assert_eq!(stored.email.as_deref(), Some("ana@example.com"));
    assert_eq!(stored.id, Some(OWNER_ID.into()));
}

#[tokio::test]
async fn test_username_change_ends_the_session() {
    let ctx = TestContext::new_with_config(TestConfig {
        start_path: "/profile".to_string(),
        ..TestConfig::logged_in(OWNER_ID)
    })
    .await;
    ctx.mock
        .mock_json("PUT", "/api/user/update-username", 200, json!({ "success": true, "message": "Updated" }))
        .await;

    let response = ctx.services.user_service.update_username("ana_souza").await;

    assert_eq!(response.message(), Some("Updated"));
    assert!(!ctx.services.auth_service.is_authenticated().await);
    assert_eq!(ctx.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_account_deletion_accepts_no_content() {
    let ctx = logged_in_context(OWNER_ID).await;
    Mock::given(method("DELETE"))
        .and(path("/api/user/delete"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&ctx.mock.server)
        .await;

    assert!(ctx.services.user_service.delete_account("Secret1!").await.is_success());
    assert!(ctx.store.token().await.is_none());
}

#[tokio::test]
async fn test_file_store_shares_session_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let first = FileSessionStore::open(&path).await.unwrap();
    first.set_token("shared-token").await.unwrap();
    first.set_user(&StoredUser::with_username("ana")).await.unwrap();

    let second = FileSessionStore::open(&path).await.unwrap();
    assert_eq!(second.token().await.as_deref(), Some("shared-token"));
    assert_eq!(second.user().await.and_then(|u| u.username).as_deref(), Some("ana"));

    let mut events = first.subscribe();
    second.clear().await.unwrap();
    assert!(!path.exists());

    assert!(first.sync_from_disk().await.unwrap());
    assert_matches!(events.try_recv(), Ok(SessionEvent::ExternalChange));
    assert!(first.token().await.is_none());
    assert!(!first.sync_from_disk().await.unwrap());
}

#[tokio::test]
async fn test_corrupt_session_file_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let store = FileSessionStore::open(&path).await.unwrap();
    assert!(store.token().await.is_none());
}
