//! Test data builders
//!
//! JSON payloads shaped like the EventSphere API responses, plus a few
//! domain values used across the integration tests.

use chrono::{Duration, Local, NaiveTime, Utc};
use eventsphere::models::{Access, EventDraft};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

pub const OWNER_ID: i64 = 1;
pub const COLLABORATOR_ID: i64 = 2;
pub const PARTICIPANT_ID: i64 = 3;

/// Event as returned by `/api/event/{id}`, with one collaborator and one participant
pub fn event_json(id: i64, state: &str) -> Value {
    json!({
        "id": id,
        "name": "Rust meetup",
        "description": "Monthly meetup",
        "localization": "Main hall",
        "dateFixedStart": "2030-05-01",
        "dateFixedEnd": "2030-05-01",
        "timeFixedStart": "18:00:00",
        "timeFixedEnd": "21:00:00",
        "maxParticipants": 50,
        "classification": 18,
        "acess": "PUBLIC",
        "state": state,
        // Some endpoints send ids as strings
        "ownerId": OWNER_ID.to_string(),
        "ownerName": "Olivia",
        "participants": [
            {
                "id": 20,
                "userId": COLLABORATOR_ID,
                "userName": "Carla",
                "confirmed": true,
                "isCollaborator": true,
                "currentStatus": "CONFIRMED"
            },
            {
                "id": 30,
                "userId": PARTICIPANT_ID,
                "userName": "Pedro",
                "confirmed": false,
                "collaborator": false,
                "status": "INVITED"
            }
        ]
    })
}

pub fn event_list_json(ids: &[i64]) -> Value {
    Value::Array(ids.iter().map(|id| event_json(*id, "CREATED")).collect())
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "name": "Ana Souza",
        "email": format!("{}@example.com", username),
        "username": username,
        "photo": "iVBORw0KGgoAAAANSUhEUg=="
    })
}

pub fn presence_json(participant_id: i64, name: &str) -> Value {
    json!({
        "id": participant_id,
        "userId": participant_id + 100,
        "name": name,
        "status": "PRESENT",
        "scannedAt": "2030-05-01T18:05:00"
    })
}

/// A signed JWT expiring `seconds_from_now` seconds from now
pub fn jwt_expiring_in(seconds_from_now: i64) -> String {
    let claims = json!({
        "sub": "ana",
        "exp": Utc::now().timestamp() + seconds_from_now,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret"))
        .expect("Failed to sign test token")
}

/// A valid draft starting tomorrow, leaving every optional field unset
pub fn tomorrow_draft() -> EventDraft {
    EventDraft {
        name: "Team meetup".to_string(),
        localization: "Main hall".to_string(),
        date_fixed_start: Some(Local::now().date_naive() + Duration::days(1)),
        time_fixed_start: NaiveTime::from_hms_opt(10, 0, 0),
        time_fixed_end: NaiveTime::from_hms_opt(12, 0, 0),
        access: Access::Public,
        ..Default::default()
    }
}
