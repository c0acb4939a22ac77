//! Participant model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EventId, ParticipantId, UserId};

/// Attendance status of a participant within one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Invited,
    Confirmed,
    Present,
    Absent,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl ParticipantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantStatus::Invited => "INVITED",
            ParticipantStatus::Confirmed => "CONFIRMED",
            ParticipantStatus::Present => "PRESENT",
            ParticipantStatus::Absent => "ABSENT",
            ParticipantStatus::Canceled => "CANCELED",
            ParticipantStatus::Unknown => "UNKNOWN",
        }
    }
}

impl Default for ParticipantStatus {
    fn default() -> Self {
        ParticipantStatus::Unknown
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INVITED" => Ok(ParticipantStatus::Invited),
            "CONFIRMED" => Ok(ParticipantStatus::Confirmed),
            "PRESENT" => Ok(ParticipantStatus::Present),
            "ABSENT" => Ok(ParticipantStatus::Absent),
            "CANCELED" | "CANCELLED" => Ok(ParticipantStatus::Canceled),
            other => Err(format!("unknown participant status: {}", other)),
        }
    }
}

/// A user's membership record within one event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: Option<ParticipantId>,
    pub event_id: Option<EventId>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_username: Option<String>,
    pub user_email: Option<String>,
    pub user_photo: Option<String>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub confirmed: bool,
    #[serde(deserialize_with = "super::null_to_default")]
    pub is_collaborator: bool,
    /// Bean-style spelling of the collaborator flag used by some endpoints
    #[serde(rename = "collaborator", skip_serializing)]
    pub collaborator_flag: Option<bool>,
    pub status: Option<ParticipantStatus>,
    pub current_status: Option<ParticipantStatus>,
}

impl Participant {
    pub fn collaborator(&self) -> bool {
        self.is_collaborator || self.collaborator_flag.unwrap_or(false)
    }

    /// Attendance status, preferring the live `currentStatus` field
    pub fn attendance_status(&self) -> ParticipantStatus {
        self.current_status.or(self.status).unwrap_or_default()
    }

    /// Best available display name
    pub fn display_name(&self) -> String {
        self.user_name
            .clone()
            .or_else(|| self.user_username.clone())
            .or_else(|| self.user_email.clone())
            .unwrap_or_else(|| "Participant".to_string())
    }
}

/// Minimal user info nested in presence responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Participant marked present through a scanned token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresenceRecord {
    pub id: Option<ParticipantId>,
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    #[serde(deserialize_with = "super::null_to_default")]
    pub status: ParticipantStatus,
    pub user: Option<PresenceUser>,
    pub scanned_at: Option<String>,
}

impl PresenceRecord {
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "Participant".to_string())
    }
}

/// QR code a participant shows at the venue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrCodeData {
    pub qr_code_image: Option<String>,
    pub qr_code_text: Option<String>,
    pub participant_id: Option<ParticipantId>,
    pub event_name: Option<String>,
}

/// Row of the attendance report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceEntry {
    pub id: Option<ParticipantId>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub is_collaborator: bool,
    pub current_status: Option<String>,
}

/// Attendance summary of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceReport {
    pub event_name: Option<String>,
    pub event_state: Option<String>,
    pub total_participants: u32,
    pub present_count: u32,
    pub absent_count: u32,
    pub present_participants: Vec<AttendanceEntry>,
    pub absent_participants: Vec<AttendanceEntry>,
}

impl AttendanceReport {
    /// Share of participants present, in percent
    pub fn attendance_rate(&self) -> f64 {
        if self.total_participants == 0 {
            0.0
        } else {
            f64::from(self.present_count) * 100.0 / f64::from(self.total_participants)
        }
    }
}

/// Payload for inviting a user to an event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteParticipantRequest {
    pub event_id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
