//! Test context for unified test setup
//!
//! This module provides a unified test context that wires a mock API
//! server, an in-memory session and a recording navigator into a full
//! service factory.

use eventsphere::config::Settings;
use eventsphere::models::StoredUser;
use eventsphere::services::ServiceFactory;
use eventsphere::state::{MemoryNavigator, MemorySessionStore, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use super::api_mock::ApiMockServer;

/// Unified test context that manages all test components
pub struct TestContext {
    pub mock: ApiMockServer,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<MemoryNavigator>,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub temp_dir: TempDir,
}

/// Configuration for test context creation
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Path the navigator starts on
    pub start_path: String,
    /// Token stored before the services are built
    pub token: Option<String>,
    pub user: Option<StoredUser>,
    pub eager_validation: bool,
    /// Point the client at this URL instead of the mock server
    pub base_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            start_path: "/events".to_string(),
            token: None,
            user: None,
            eager_validation: false,
            base_url: None,
        }
    }
}

impl TestConfig {
    /// A logged-in user with an opaque token
    pub fn logged_in(user_id: i64) -> Self {
        Self {
            token: Some("opaque-test-token".to_string()),
            user: Some(StoredUser {
                id: Some(user_id.into()),
                username: Some("ana".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl TestContext {
    /// Create a context without a session
    pub async fn new() -> Self {
        Self::new_with_config(TestConfig::default()).await
    }

    /// Create a new test context with custom configuration
    pub async fn new_with_config(config: TestConfig) -> Self {
        // Initialize logging once
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mock = ApiMockServer::new().await;

        let mut settings = Settings::default();
        settings.api.base_url = config.base_url.clone().unwrap_or_else(|| mock.uri());
        settings.api.timeout_seconds = 5;
        settings.session.storage_path = temp_dir.path().join("session.json").to_string_lossy().into_owned();
        settings.features.eager_token_validation = config.eager_validation;
        settings.validate().expect("Test settings should be valid");

        let store = Arc::new(MemorySessionStore::new());
        if let Some(token) = &config.token {
            store.set_token(token).await.expect("Failed to store token");
        }
        if let Some(user) = &config.user {
            store.set_user(user).await.expect("Failed to store user");
        }
        let navigator = Arc::new(MemoryNavigator::new(&config.start_path));

        let services = ServiceFactory::new(&settings, store.clone(), navigator.clone())
            .expect("Failed to build services");

        Self {
            mock,
            store,
            navigator,
            settings,
            services,
            temp_dir,
        }
    }

    /// Path of a file inside the context's temporary directory
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn redirects(&self) -> Vec<String> {
        self.navigator.redirects()
    }
}
