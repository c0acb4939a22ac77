//! Integration tests module
//!
//! This module contains the integration tests of the EventSphere client,
//! organized by functionality.

pub mod attendance_test;
pub mod events_test;
pub mod participants_test;
pub mod session_test;

use crate::helpers::{TestConfig, TestContext};

/// Context for a user who is logged in with an opaque token
pub async fn logged_in_context(user_id: i64) -> TestContext {
    TestContext::new_with_config(TestConfig::logged_in(user_id)).await
}
