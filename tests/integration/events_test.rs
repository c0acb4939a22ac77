//! Event integration tests
//!
//! Lists, details, creation, lifecycle transitions and event images.

use chrono::{Duration, Local};
use eventsphere::models::{EventId, EventState};
use eventsphere::services::event::{DEFAULT_CLASSIFICATION, DEFAULT_MAX_PARTICIPANTS};
use eventsphere::utils::errors::ErrorCategory;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::*;
use crate::integration::logged_in_context;

#[tokio::test]
async fn test_create_event_sends_defaults() {
    let ctx = logged_in_context(OWNER_ID).await;
    let draft = tomorrow_draft();
    let start = draft.date_fixed_start.unwrap().format("%Y-%m-%d").to_string();

    Mock::given(method("POST"))
        .and(path("/api/event/register"))
        .and(body_partial_json(json!({
            "name": "Team meetup",
            "dateFixedStart": start,
            "dateFixedEnd": start,
            "timeFixedStart": "10:00",
            "timeFixedEnd": "12:00",
            "maxParticipants": DEFAULT_MAX_PARTICIPANTS,
            "classification": DEFAULT_CLASSIFICATION,
            "acess": "PUBLIC"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Event created",
            "data": { "id": 77, "name": "Team meetup", "state": "CREATED" }
        })))
        .expect(1)
        .mount(&ctx.mock.server)
        .await;

    let response = ctx
        .services
        .event_service
        .create_event(&draft, Local::now().naive_local())
        .await;

    assert_eq!(response.message(), Some("Event created"));
    let event = response.into_data().unwrap();
    assert_eq!(event.id, Some(EventId(77)));
    assert_eq!(event.state, EventState::Created);
}

#[tokio::test]
async fn test_create_event_in_the_past_is_rejected_locally() {
    let ctx = logged_in_context(OWNER_ID).await;
    let mut draft = tomorrow_draft();
    draft.date_fixed_start = Some(Local::now().date_naive() - Duration::days(2));

    let response = ctx
        .services
        .event_service
        .create_event(&draft, Local::now().naive_local())
        .await;

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::Validation);
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_dashboard_lists_fail_independently() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json("GET", "/api/event/my", 500, json!({ "message": "database down" }))
        .await;
    ctx.mock
        .mock_envelope("GET", "/api/event/public", event_list_json(&[1, 2]))
        .await;

    let dashboard = ctx.services.event_service.dashboard().await;

    let failure = dashboard.my_events.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Server);
    assert!(!failure.should_redirect);

    let public = dashboard.public_events.into_data().unwrap();
    assert_eq!(public.len(), 2);
    assert_eq!(public[1].id, Some(EventId(2)));
    assert!(ctx.redirects().is_empty());
}

#[tokio::test]
async fn test_bare_event_list_is_accepted() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json("GET", "/api/event/next-events", 200, event_list_json(&[4]))
        .await;

    let events = ctx.services.event_service.next_events().await.into_data().unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_temporary_event_ids_never_reach_the_server() {
    let ctx = logged_in_context(OWNER_ID).await;

    let response = ctx.services.event_service.event_details("temp_1712", false).await;

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::NotFound);
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_fresh_details_bypass_caches() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock.mock_envelope("GET", "/api/event/5", event_json(5, "CREATED")).await;

    let event = ctx.services.event_service.event_details("5", true).await.into_data().unwrap();

    assert_eq!(event.owner_id, Some(OWNER_ID.into()));
    assert_eq!(event.participants.len(), 2);
    let sent = ctx.mock.requests_to("/api/event/5").await;
    assert!(sent[0].url.query_pairs().any(|(name, _)| name == "_t"));
}

#[tokio::test]
async fn test_impossible_transition_sends_nothing() {
    let ctx = logged_in_context(OWNER_ID).await;

    let response = ctx
        .services
        .event_service
        .start_event(EventId(5), Some(EventState::Finished), true)
        .await;

    let failure = response.into_result().unwrap_err();
    assert_eq!(failure.category, ErrorCategory::Validation);
    assert_eq!(failure.message, "Event cannot move from FINISHED to ACTIVE");
    assert!(ctx.mock.requests().await.is_empty());
}

#[tokio::test]
async fn test_start_event_refetches_state() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .expect_json("PUT", "/api/event/5/start", 200, json!({ "success": true, "message": "Started" }), 1)
        .await;
    ctx.mock.mock_envelope("GET", "/api/event/5", event_json(5, "ACTIVE")).await;

    let response = ctx
        .services
        .event_service
        .start_event(EventId(5), Some(EventState::Created), true)
        .await;

    assert_eq!(response.message(), Some("Started"));
    let event = response.into_data().flatten().unwrap();
    assert_eq!(event.state, EventState::Active);
}

#[tokio::test]
async fn test_event_code_is_read_from_either_shape() {
    let ctx = logged_in_context(OWNER_ID).await;
    ctx.mock
        .mock_json("GET", "/api/event/5/code", 200, json!({ "success": true, "data": { "eventCode": "K7Q2XZ" } }))
        .await;

    let code = ctx.services.event_service.generate_event_code(EventId(5)).await;
    assert_eq!(code.into_data().as_deref(), Some("K7Q2XZ"));
}

#[tokio::test]
async fn test_event_code_validation_uses_query() {
    let ctx = logged_in_context(OWNER_ID).await;
    Mock::given(method("GET"))
        .and(path("/api/event/validate-code"))
        .and(query_param("eventCode", "K7Q2XZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "eventId": 5 }))))
        .expect(1)
        .mount(&ctx.mock.server)
        .await;

    let details = ctx.services.event_service.validate_event_code(" K7Q2XZ ").await;
    assert_eq!(details.into_data().unwrap()["eventId"], 5);
}

#[tokio::test]
async fn test_image_upload_sends_multipart_fields() {
    let ctx = logged_in_context(OWNER_ID).await;
    let image = ctx.temp_path("cover.png");
    std::fs::write(&image, b"\x89PNG\r\n\x1a\nfake image bytes").unwrap();

    ctx.mock.mock_profile(user_json(OWNER_ID, "ana")).await;
    ctx.mock
        .mock_json(
            "POST",
            "/api/upload/event-image",
            200,
            json!({ "success": true, "imageUrl": "/uploads/events/cover.png", "fileName": "cover.png" }),
        )
        .await;

    let uploaded = ctx
        .services
        .event_service
        .upload_event_photo(EventId(5), &image)
        .await
        .into_data()
        .unwrap();

    assert_eq!(uploaded.image_url.as_deref(), Some("/uploads/events/cover.png"));
    assert_eq!(uploaded.file_name.as_deref(), Some("cover.png"));

    let sent = ctx.mock.requests_to("/api/upload/event-image").await;
    let body = String::from_utf8_lossy(&sent[0].body);
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("name=\"eventID\""));
    assert!(body.contains("image/png"));
}

#[tokio::test]
async fn test_unsupported_image_is_rejected_before_upload() {
    let ctx = logged_in_context(OWNER_ID).await;
    let notes = ctx.temp_path("notes.txt");
    std::fs::write(&notes, b"not an image").unwrap();

    let response = ctx.services.event_service.upload_event_image(EventId(5), &notes).await;

    assert_eq!(response.into_result().unwrap_err().category, ErrorCategory::Validation);
    assert!(ctx.mock.requests().await.is_empty());
}
