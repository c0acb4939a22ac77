//! Attendance scanning integration tests
//!
//! The scanner is driven with explicit instants against the participant
//! service and a mock API.

use assert_matches::assert_matches;
use eventsphere::models::{EventId, ParticipantId};
use eventsphere::services::participant::ParticipantService;
use eventsphere::state::{AttendanceScanner, ScanOutcome, ScannerState};
use eventsphere::utils::errors::messages;
use serde_json::json;
use std::time::{Duration, Instant};

use crate::helpers::*;
use crate::integration::logged_in_context;

fn scanner(ctx: &TestContext) -> AttendanceScanner<ParticipantService> {
    let mut scanner = AttendanceScanner::new(ctx.services.participant_service.clone(), &ctx.settings.scanner);
    scanner.start();
    scanner
}

#[tokio::test]
async fn test_scan_marks_presence_then_cools_down() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .expect_json(
            "POST",
            "/api/participant/presence/482913",
            200,
            envelope(presence_json(31, "Rita")),
            1,
        )
        .await;
    let mut scanner = scanner(&ctx);
    let now = Instant::now();

    let outcome = scanner.on_decoded("EVT-482913", now).await;
    assert_matches!(outcome, Some(ScanOutcome::Marked(ref r)) if r.id == Some(ParticipantId(31)));
    assert_eq!(scanner.scanned().len(), 1);

    // The same code still in frame is ignored
    assert!(scanner.on_decoded("EVT-482913", now + Duration::from_millis(500)).await.is_none());

    let resume = now + Duration::from_millis(ctx.settings.scanner.success_display_ms);
    scanner.tick(resume);
    assert_eq!(scanner.state(), &ScannerState::Scanning);
}

#[tokio::test]
async fn test_preloaded_participant_is_a_duplicate() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_envelope("GET", "/api/participant/present/10", json!([presence_json(30, "Pedro")]))
        .await;
    ctx.mock
        .mock_envelope("POST", "/api/participant/presence/100030", presence_json(30, "Pedro"))
        .await;

    let present = ctx
        .services
        .participant_service
        .present_participants(EventId(10))
        .await
        .into_data()
        .unwrap();
    let mut scanner = scanner(&ctx);
    scanner.preload(present);

    let outcome = scanner.on_decoded("100030", Instant::now()).await;

    assert_matches!(outcome, Some(ScanOutcome::Duplicate(_)));
    assert_eq!(scanner.scanned().len(), 1);
}

#[tokio::test]
async fn test_server_side_duplicate_is_a_notice() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json(
            "POST",
            "/api/participant/presence/777777",
            409,
            json!({ "message": "Participante já está presente" }),
        )
        .await;
    let mut scanner = scanner(&ctx);

    let outcome = scanner.on_decoded("777777", Instant::now()).await.unwrap();

    assert_matches!(outcome, ScanOutcome::AlreadyPresent(_));
    assert!(!outcome.is_success());
    assert!(scanner.scanned().is_empty());
}

#[tokio::test]
async fn test_short_token_never_reaches_the_server() {
    let ctx = logged_in_context(OWNER_ID).await;
    let mut scanner = scanner(&ctx);
    let now = Instant::now();

    let outcome = scanner.on_decoded("12-34", now).await.unwrap();

    assert_eq!(outcome, ScanOutcome::InvalidToken);
    assert_eq!(outcome.message(), messages::INVALID_QR);
    assert!(ctx.mock.requests().await.is_empty());

    let pause = Duration::from_millis(ctx.settings.scanner.scan_pause_ms);
    assert_matches!(scanner.state(), ScannerState::Cooldown { until, .. } if *until == now + pause);
}

#[tokio::test]
async fn test_manual_entry_while_idle_stays_idle() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_envelope("POST", "/api/participant/presence/246810", presence_json(32, "Caio"))
        .await;
    let mut scanner = AttendanceScanner::new(ctx.services.participant_service.clone(), &ctx.settings.scanner);

    let outcome = scanner.submit_manual(" 246810 ", Instant::now()).await;

    assert_matches!(outcome, Some(ScanOutcome::Marked(_)));
    assert_eq!(scanner.state(), &ScannerState::Idle);
}

#[tokio::test]
async fn test_rejected_session_fails_the_scan() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock.mock_unauthorized("POST", "/api/participant/presence/135790").await;
    let mut scanner = scanner(&ctx);

    let outcome = scanner.on_decoded("135790", Instant::now()).await.unwrap();

    assert_eq!(outcome, ScanOutcome::Failed(messages::SESSION_EXPIRED.to_string()));
    assert_eq!(ctx.redirects(), vec!["/login".to_string()]);
}
