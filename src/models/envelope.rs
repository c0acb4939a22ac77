//! Response envelope normalization
//!
//! The API wraps most payloads as `{success, message, data}`, but several
//! endpoints return the payload bare or under a resource-specific key.
//! Each accessor below tries the shapes observed for one resource, in
//! order, and yields a single internal type.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::event::{Event, InviteLink, UploadedImage};
use super::user::User;
use crate::utils::errors::{EventSphereError, Result};

/// Successful HTTP response with its decoded JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// An empty response, as sent with 204
    pub fn empty(status: u16) -> Self {
        Self { status, body: Value::Null }
    }

    /// `success` flag of the envelope, falling back to the HTTP status
    pub fn success(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or((200..300).contains(&self.status))
    }

    pub fn message(&self) -> Option<String> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Message of the envelope or the given default
    pub fn message_or(&self, default: &str) -> String {
        self.message().unwrap_or_else(|| default.to_string())
    }

    /// The `data` member, if present and not null
    pub fn data(&self) -> Option<&Value> {
        non_null(self.body.get("data"))
    }

    /// Decode `data` into `T`
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self
            .data()
            .ok_or_else(|| EventSphereError::InvalidResponse("response has no data".to_string()))?;
        decode(data)
    }

    /// Single event: `data | event | body`
    pub fn event(&self) -> Result<Event> {
        let value = self
            .first_of(&["data", "event"])
            .unwrap_or(&self.body);
        decode(value)
    }

    /// Event list: `data | events | body`; a missing list is empty
    pub fn events(&self) -> Result<Vec<Event>> {
        let value = self.first_of(&["data", "events"]).unwrap_or(&self.body);
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => decode(value),
            other => Err(EventSphereError::InvalidResponse(format!(
                "expected an event list, got {}",
                json_kind(other)
            ))),
        }
    }

    /// User profile: `data | body`
    pub fn user(&self) -> Result<User> {
        decode(self.data().unwrap_or(&self.body))
    }

    /// Uploaded image URL: `data.imageUrl | imageUrl | image | url`
    pub fn image_url(&self) -> Option<String> {
        self.data()
            .and_then(|d| string_at(d, "imageUrl"))
            .or_else(|| string_at(&self.body, "imageUrl"))
            .or_else(|| string_at(&self.body, "image"))
            .or_else(|| string_at(&self.body, "url"))
    }

    pub fn uploaded_image(&self) -> UploadedImage {
        UploadedImage {
            image_url: self.image_url(),
            file_name: string_at(&self.body, "fileName"),
        }
    }

    /// Event access code: `eventCode | data.eventCode`
    pub fn event_code(&self) -> Option<String> {
        string_at(&self.body, "eventCode").or_else(|| self.data().and_then(|d| string_at(d, "eventCode")))
    }

    /// Invite link data under `data`
    pub fn invite_link(&self) -> Result<InviteLink> {
        self.data_as()
    }

    /// Uploaded user photo: `data.photoBase64 | photoBase64`
    pub fn photo_base64(&self) -> Option<String> {
        self.data()
            .and_then(|d| string_at(d, "photoBase64"))
            .or_else(|| string_at(&self.body, "photoBase64"))
    }

    fn first_of(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| non_null(self.body.get(*k)))
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| EventSphereError::InvalidResponse(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
