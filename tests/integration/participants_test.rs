//! Participant integration tests

use eventsphere::models::{Event, EventId, ParticipantId, ParticipantStatus, UserId};
use eventsphere::state::normalize_token;
use eventsphere::utils::errors::{ErrorCategory, EventSphereError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::*;
use crate::integration::logged_in_context;

fn meetup() -> Event {
    serde_json::from_value(event_json(10, "CREATED")).unwrap()
}

#[tokio::test]
async fn test_owner_cannot_be_promoted_or_demoted() {
    let ctx = logged_in_context(OWNER_ID).await;
    let event = meetup();
    let owner = UserId(OWNER_ID);

    let promoted = ctx.services.participant_service.promote_to_collaborator(&event, owner).await;
    let demoted = ctx.services.participant_service.demote_collaborator(&event, owner).await;
    let removed = ctx.services.participant_service.remove_participant(&event, owner).await;

    for response in [promoted, demoted, removed] {
        assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::Permission);
    }
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_demote_targets_the_user_id() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .expect_json(
            "PUT",
            "/api/participant/demote/10/2",
            200,
            json!({ "success": true, "message": "Colaborador removido" }),
            1,
        )
        .await;

    let response = ctx
        .services
        .participant_service
        .demote_collaborator(&meetup(), UserId(COLLABORATOR_ID))
        .await;

    assert_eq!(response.message(), Some("Colaborador removido"));
}

#[tokio::test]
async fn test_remove_participant_uses_delete() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .expect_json("DELETE", "/api/participant/remove/10/3", 200, json!({ "success": true }), 1)
        .await;

    let response = ctx
        .services
        .participant_service
        .remove_participant(&meetup(), UserId(PARTICIPANT_ID))
        .await;

    assert_eq!(response.message(), Some("Participant removed"));
}

#[tokio::test]
async fn test_join_with_code_sends_event_and_code() {
    let ctx = logged_in_context(PARTICIPANT_ID).await;
    Mock::given(method("POST"))
        .and(path("/api/participant/join-with-code"))
        .and(body_partial_json(json!({ "eventId": 10, "eventCode": "K7Q2XZ" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&ctx.mock.server)
        .await;

    let response = ctx
        .services
        .participant_service
        .join_event_with_code(EventId(10), "K7Q2XZ")
        .await;

    assert_eq!(response.message(), Some("You joined the event"));
}

#[tokio::test]
async fn test_full_event_reports_conflict() {
    let ctx = logged_in_context(PARTICIPANT_ID).await;
    ctx.mock
        .mock_json("POST", "/api/participant/join-event", 409, json!({ "message": "Evento lotado" }))
        .await;

    let failure = ctx
        .services
        .participant_service
        .join_public_event(EventId(10))
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(failure.category, ErrorCategory::Conflict);
    assert_eq!(failure.message, "Evento lotado");
    assert!(!failure.should_redirect);
}

#[tokio::test]
async fn test_status_update_sends_wire_name() {
    let ctx = logged_in_context(OWNER_ID).await;
    Mock::given(method("PUT"))
        .and(path("/api/participant/status/30"))
        .and(body_partial_json(json!({ "status": "PRESENT" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&ctx.mock.server)
        .await;

    let response = ctx
        .services
        .participant_service
        .update_participant_status(ParticipantId(30), ParticipantStatus::Present)
        .await;

    assert!(response.is_success());
}

#[tokio::test]
async fn test_invite_requires_a_target() {
    let ctx = logged_in_context(OWNER_ID).await;

    let response = ctx
        .services
        .participant_service
        .invite_participant(EventId(10), None, None)
        .await;

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::Validation);
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_mark_presence_returns_record() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_envelope("POST", "/api/participant/presence/123456", presence_json(30, "Pedro"))
        .await;

    let token = normalize_token("123456").unwrap();
    let record = ctx
        .services
        .participant_service
        .mark_presence_by_token(&token)
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(record.id, Some(ParticipantId(30)));
    assert_eq!(record.user_id, Some(UserId(130)));
    assert_eq!(record.status, ParticipantStatus::Present);
    assert_eq!(record.display_name(), "Pedro");
}

#[tokio::test]
async fn test_already_present_is_returned_as_error() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json(
            "POST",
            "/api/participant/presence/123456",
            409,
            json!({ "message": "Participante já está presente" }),
        )
        .await;

    let token = normalize_token("123456").unwrap();
    let result = ctx.services.participant_service.mark_presence_by_token(&token).await;

    match result {
        Err(EventSphereError::AlreadyPresent(message)) => assert_eq!(message, "Participante já está presente"),
        other => panic!("expected AlreadyPresent, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_presence_failures_are_normalized() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json("POST", "/api/participant/presence/654321", 404, json!({ "message": "Token inválido" }))
        .await;

    let token = normalize_token("654321").unwrap();
    let response = ctx
        .services
        .participant_service
        .mark_presence_by_token(&token)
        .await
        .unwrap();

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_present_participants_tolerates_missing_data() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_envelope(
            "GET",
            "/api/participant/present/10",
            json!([presence_json(30, "Pedro"), presence_json(31, "Rita")]),
        )
        .await;
    ctx.mock
        .mock_json("GET", "/api/participant/present/11", 200, json!({ "success": true, "data": null }))
        .await;

    let present = ctx
        .services
        .participant_service
        .present_participants(EventId(10))
        .await
        .into_data()
        .unwrap();
    assert_eq!(present.len(), 2);
    assert_eq!(present[1].display_name(), "Rita");

    let empty = ctx
        .services
        .participant_service
        .present_participants(EventId(11))
        .await
        .into_data()
        .unwrap();
    assert!(empty.is_empty());
}
