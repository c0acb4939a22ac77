//! Data models module
//!
//! This module contains all data structures exchanged with the EventSphere API

pub mod envelope;
pub mod event;
pub mod ids;
pub mod participant;
pub mod user;

use serde::{Deserialize, Deserializer};

// Re-export commonly used models
pub use envelope::ApiResponse;
pub use event::{Access, CreateEventRequest, Event, EventDraft, EventState, InviteLink, UpdateEventRequest, UploadedImage};
pub use ids::{EventId, ParticipantId, UserId};
pub use participant::{
    AttendanceEntry, AttendanceReport, InviteParticipantRequest, Participant, ParticipantStatus, PresenceRecord,
    PresenceUser, QrCodeData,
};
pub use user::{LoginRequest, RegisterRequest, StoredUser, TokenResponse, User, UserPatch};

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
