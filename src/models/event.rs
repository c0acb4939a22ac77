//! Event model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EventId, UserId};
use super::participant::Participant;

/// Lifecycle state reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Created,
    Active,
    Finished,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl EventState {
    /// Transitions the server accepts: CREATED -> ACTIVE -> FINISHED, CREATED -> CANCELED
    pub fn can_transition_to(self, next: EventState) -> bool {
        matches!(
            (self, next),
            (EventState::Created, EventState::Active)
                | (EventState::Active, EventState::Finished)
                | (EventState::Created, EventState::Canceled)
        )
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, EventState::Finished | EventState::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventState::Created => "CREATED",
            EventState::Active => "ACTIVE",
            EventState::Finished => "FINISHED",
            EventState::Canceled => "CANCELED",
            EventState::Unknown => "UNKNOWN",
        }
    }
}

impl Default for EventState {
    fn default() -> Self {
        EventState::Unknown
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Access {
    Public,
    Private,
}

impl Default for Access {
    fn default() -> Self {
        Access::Public
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("PUBLIC"),
            Access::Private => f.write_str("PRIVATE"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: Option<EventId>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub name: String,
    pub description: Option<String>,
    pub localization: Option<String>,
    pub date_fixed_start: Option<NaiveDate>,
    pub date_fixed_end: Option<NaiveDate>,
    #[serde(with = "flexible_time::option")]
    pub time_fixed_start: Option<NaiveTime>,
    #[serde(with = "flexible_time::option")]
    pub time_fixed_end: Option<NaiveTime>,
    pub max_participants: Option<i32>,
    pub classification: Option<i32>,
    #[serde(alias = "acess")]
    pub access: Option<Access>,
    pub photo: Option<String>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub state: EventState,
    pub owner_id: Option<UserId>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub participants: Vec<Participant>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub collaborator_ids: Vec<UserId>,
    /// Role reported by the server for the caller, when it opines
    pub user_status: Option<String>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub user_confirmed: bool,
    /// Server verdict on edit rights; takes precedence over local derivation
    pub can_edit: Option<bool>,
    pub invite_token: Option<String>,
    pub invite_code: Option<String>,
}

impl Event {
    pub fn is_public(&self) -> bool {
        self.access.unwrap_or_default() == Access::Public
    }

    /// Participant record of the given user
    pub fn participant(&self, user_id: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == Some(user_id))
    }

    pub fn confirmed_count(&self) -> usize {
        self.participants.iter().filter(|p| p.confirmed).count()
    }
}

/// Payload for the create-event endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    pub date_fixed_start: NaiveDate,
    pub date_fixed_end: NaiveDate,
    #[serde(with = "flexible_time")]
    pub time_fixed_start: NaiveTime,
    #[serde(with = "flexible_time")]
    pub time_fixed_end: NaiveTime,
    pub localization: String,
    pub description: Option<String>,
    pub max_participants: i32,
    pub classification: i32,
    #[serde(rename = "acess")]
    pub access: Access,
    pub photo: Option<String>,
}

/// User input for a new event, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub name: String,
    pub description: Option<String>,
    pub localization: String,
    pub date_fixed_start: Option<NaiveDate>,
    pub date_fixed_end: Option<NaiveDate>,
    pub time_fixed_start: Option<NaiveTime>,
    pub time_fixed_end: Option<NaiveTime>,
    pub max_participants: Option<i32>,
    pub classification: Option<i32>,
    pub access: Access,
}

/// Partial update for the edit-event endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_fixed_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_fixed_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", with = "flexible_time::option")]
    pub time_fixed_start: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none", with = "flexible_time::option")]
    pub time_fixed_end: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<i32>,
    #[serde(rename = "acess", skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

/// Invitation link generated for a private event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteLink {
    pub invite_token: String,
    pub invite_url: Option<String>,
}

/// Server response for an uploaded event image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedImage {
    pub image_url: Option<String>,
    pub file_name: Option<String>,
}

/// Times are exchanged as `HH:MM` by the client and `HH:MM:SS` by the server.
pub mod flexible_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time: {:?}", raw)))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid time: {:?}", raw))),
            }
        }
    }
}
