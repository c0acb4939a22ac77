//! Participant service implementation
//!
//! Joining and leaving events, participant management and attendance.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::ServiceResponse;
use crate::api::{ApiClient, Endpoint, Params};
use crate::models::{
    ApiResponse, AttendanceReport, Event, EventId, InviteParticipantRequest, ParticipantId, ParticipantStatus, PresenceRecord,
    QrCodeData, UserId,
};
use crate::state::{PresenceMarker, PresenceToken};
use crate::utils::errors::{ErrorCategory, EventSphereError, Result};
use crate::utils::logging::{log_event_action, log_rejected};

/// Participant service for managing event membership and attendance
#[derive(Clone)]
pub struct ParticipantService {
    client: ApiClient,
}

impl ParticipantService {
    /// Create a new ParticipantService instance
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Invite a user by email or username
    pub async fn invite_participant(
        &self,
        event_id: EventId,
        email: Option<String>,
        username: Option<String>,
    ) -> ServiceResponse<Value> {
        if email.is_none() && username.is_none() {
            return ServiceResponse::invalid("An email or username is required");
        }
        let request = InviteParticipantRequest {
            event_id,
            email,
            username,
        };
        let result = self.client.post(Endpoint::ParticipantInvite, &Params::new(), &request).await;
        self.respond(result, "invite_participant", "Invitation sent")
    }

    pub async fn update_participant_status(
        &self,
        participant_id: ParticipantId,
        status: ParticipantStatus,
    ) -> ServiceResponse<Value> {
        let params = Params::new().with("participantId", participant_id);
        let body = json!({ "status": status });
        let result = self.client.put(Endpoint::ParticipantStatusUpdate, &params, &body).await;
        self.respond(result, "update_participant_status", "Status updated")
    }

    /// Confirm the current user's attendance
    pub async fn confirm_attendance(&self, event_id: EventId) -> ServiceResponse<Value> {
        let body = json!({ "eventId": event_id });
        let result = self.client.post(Endpoint::ParticipantConfirm, &Params::new(), &body).await;
        self.respond(result, "confirm_attendance", "Attendance confirmed")
    }

    pub async fn join_public_event(&self, event_id: EventId) -> ServiceResponse<Value> {
        let body = json!({ "eventId": event_id });
        let result = self.client.post(Endpoint::ParticipantJoinEvent, &Params::new(), &body).await;
        self.joined(event_id, result, "join_public_event")
    }

    pub async fn join_event_with_invite(&self, event_id: EventId, invite_token: &str) -> ServiceResponse<Value> {
        let params = Params::new().with("token", invite_token);
        let body = json!({ "eventId": event_id, "inviteToken": invite_token });
        let result = self.client.post(Endpoint::ParticipantJoinWithInvite, &params, &body).await;
        self.joined(event_id, result, "join_event_with_invite")
    }

    pub async fn join_event_with_code(&self, event_id: EventId, event_code: &str) -> ServiceResponse<Value> {
        let body = json!({ "eventId": event_id, "eventCode": event_code.trim() });
        let result = self.client.post(Endpoint::ParticipantJoinWithCode, &Params::new(), &body).await;
        self.joined(event_id, result, "join_event_with_code")
    }

    pub async fn leave_event(&self, event_id: EventId) -> ServiceResponse<Value> {
        let body = json!({ "eventId": event_id });
        let result = self.client.post(Endpoint::ParticipantLeaveEvent, &Params::new(), &body).await;
        if result.is_ok() {
            log_event_action(event_id.get(), "left", None, None);
        }
        self.respond(result, "leave_event", "You left the event")
    }

    /// Remove a user from an event; the owner cannot be removed
    pub async fn remove_participant(&self, event: &Event, user_id: UserId) -> ServiceResponse<Value> {
        let event_id = match guard_target(event, user_id, "removed") {
            Ok(id) => id,
            Err(failure) => return failure,
        };
        let params = Params::new().with("eventId", event_id).with("participantId", user_id);
        let result = self.client.delete(Endpoint::ParticipantRemoveFromEvent, &params).await;
        if result.is_ok() {
            log_event_action(event_id.get(), "participant_removed", Some(user_id.get()), None);
        }
        self.respond(result, "remove_participant", "Participant removed")
    }

    /// Confirm another user's participation
    pub async fn confirm_participant(&self, event_id: EventId, user_id: UserId) -> ServiceResponse<Value> {
        let params = Params::new().with("eventId", event_id).with("participantId", user_id);
        let result = self.client.put(Endpoint::ParticipantConfirmParticipation, &params, &json!({})).await;
        self.respond(result, "confirm_participant", "Participation confirmed")
    }

    pub async fn promote_to_collaborator(&self, event: &Event, user_id: UserId) -> ServiceResponse<Value> {
        let event_id = match guard_target(event, user_id, "promoted") {
            Ok(id) => id,
            Err(failure) => return failure,
        };
        let params = Params::new().with("eventId", event_id).with("participantId", user_id);
        let result = self.client.put(Endpoint::ParticipantPromote, &params, &json!({})).await;
        if result.is_ok() {
            log_event_action(event_id.get(), "collaborator_promoted", Some(user_id.get()), None);
        }
        self.respond(result, "promote_to_collaborator", "Participant promoted to collaborator")
    }

    pub async fn demote_collaborator(&self, event: &Event, user_id: UserId) -> ServiceResponse<Value> {
        let event_id = match guard_target(event, user_id, "demoted") {
            Ok(id) => id,
            Err(failure) => return failure,
        };
        let params = Params::new().with("eventId", event_id).with("participantId", user_id);
        let result = self.client.put(Endpoint::ParticipantDemote, &params, &json!({})).await;
        if result.is_ok() {
            log_event_action(event_id.get(), "collaborator_demoted", Some(user_id.get()), None);
        }
        self.respond(result, "demote_collaborator", "Collaborator demoted")
    }

    /// QR code the current user shows at the venue
    pub async fn generate_qr_code(&self, event_id: EventId) -> ServiceResponse<QrCodeData> {
        let params = Params::new().with("eventId", event_id);
        let result = async {
            let response = self.client.get(Endpoint::ParticipantQrCode, &params).await?;
            response.data_as::<QrCodeData>()
        };
        ServiceResponse::from_result(result.await.map(ServiceResponse::success), "generate_qr_code")
    }

    pub async fn attendance_report(&self, event_id: EventId) -> ServiceResponse<AttendanceReport> {
        let params = Params::new().with("eventId", event_id);
        let result = async {
            let response = self.client.get(Endpoint::ParticipantAttendanceReport, &params).await?;
            response.data_as::<AttendanceReport>()
        };
        ServiceResponse::from_result(result.await.map(ServiceResponse::success), "attendance_report")
    }

    /// Participants already marked present, for seeding the scanner
    pub async fn present_participants(&self, event_id: EventId) -> ServiceResponse<Vec<PresenceRecord>> {
        let params = Params::new().with("eventId", event_id);
        let result = async {
            let response = self.client.get(Endpoint::ParticipantEventPresent, &params).await?;
            match response.data() {
                Some(_) => response.data_as::<Vec<PresenceRecord>>(),
                None => Ok(Vec::new()),
            }
        };
        ServiceResponse::from_result(result.await.map(ServiceResponse::success), "present_participants")
    }

    /// Mark a participant present from a scanned token.
    ///
    /// The "already present" conflict is returned as `Err` so the caller can
    /// treat it as a notice; every other failure is normalized.
    pub async fn mark_presence_by_token(&self, token: &PresenceToken) -> Result<ServiceResponse<PresenceRecord>> {
        let params = Params::new().with("token", token.as_str());
        let result = async {
            let response = self.client.post(Endpoint::ParticipantPresence, &params, &json!({})).await?;
            let record = response.data_as::<PresenceRecord>()?;
            Ok::<_, EventSphereError>(ServiceResponse::Success {
                data: record,
                message: response.message(),
            })
        };

        match result.await {
            Ok(response) => {
                info!(token = %token, "Presence marked");
                Ok(response)
            }
            Err(e) if e.is_participant_already_present() => {
                debug!(token = %token, "Participant already present");
                Err(e)
            }
            Err(e) => Ok(ServiceResponse::from_error(&e, "mark_presence_by_token")),
        }
    }

    fn joined(&self, event_id: EventId, result: Result<ApiResponse>, context: &str) -> ServiceResponse<Value> {
        if result.is_ok() {
            log_event_action(event_id.get(), "joined", None, None);
        }
        self.respond(result, context, "You joined the event")
    }

    fn respond(&self, result: Result<ApiResponse>, context: &str, default_message: &str) -> ServiceResponse<Value> {
        match result {
            Ok(response) => {
                let data = response.data().cloned().unwrap_or(Value::Null);
                ServiceResponse::with_message(data, response.message_or(default_message))
            }
            Err(e) => ServiceResponse::from_error(&e, context),
        }
    }
}

#[async_trait]
impl PresenceMarker for ParticipantService {
    async fn mark_presence(&self, token: &PresenceToken) -> Result<ServiceResponse<PresenceRecord>> {
        self.mark_presence_by_token(token).await
    }
}

/// Refuse membership changes aimed at the event owner
fn guard_target<T>(event: &Event, user_id: UserId, verb: &str) -> std::result::Result<EventId, ServiceResponse<T>> {
    let event_id = event
        .id
        .ok_or_else(|| ServiceResponse::invalid("Event id missing or invalid"))?;
    if event.owner_id == Some(user_id) {
        log_rejected("participant_management", "target is the event owner");
        return Err(ServiceResponse::failure(
            ErrorCategory::Permission,
            format!("The event owner cannot be {}", verb),
        ));
    }
    Ok(event_id)
}
