//! Participant command handlers

use super::ParticipantCommand;
use crate::handlers::output::settle;
use crate::handlers::HandlerResult;
use crate::models::EventId;
use crate::services::ServiceFactory;

/// Handle `participant <subcommand>`
pub async fn handle_participant(services: &ServiceFactory, cmd: ParticipantCommand) -> HandlerResult {
    let participants = &services.participant_service;
    match cmd {
        ParticipantCommand::Promote { event, user } => {
            let event = settle(services.event_service.event(event).await)?;
            settle(participants.promote_to_collaborator(&event, user).await).map(drop)
        }
        ParticipantCommand::Demote { event, user } => {
            let event = settle(services.event_service.event(event).await)?;
            settle(participants.demote_collaborator(&event, user).await).map(drop)
        }
        ParticipantCommand::Remove { event, user } => {
            let event = settle(services.event_service.event(event).await)?;
            settle(participants.remove_participant(&event, user).await).map(drop)
        }
        ParticipantCommand::Confirm { event, user } => {
            settle(participants.confirm_participant(event, user).await).map(drop)
        }
        ParticipantCommand::Status { participant, status } => {
            settle(participants.update_participant_status(participant, status).await).map(drop)
        }
    }
}

/// Handle `join`; an invite token or event code selects the join flow
pub async fn handle_join(
    services: &ServiceFactory,
    event: EventId,
    invite: Option<String>,
    code: Option<String>,
) -> HandlerResult {
    let participants = &services.participant_service;
    let response = match (invite, code) {
        (Some(token), _) => participants.join_event_with_invite(event, &token).await,
        (None, Some(code)) => participants.join_event_with_code(event, &code).await,
        (None, None) => participants.join_public_event(event).await,
    };
    settle(response).map(drop)
}

/// Handle `attend`
pub async fn handle_attend(services: &ServiceFactory, event: EventId) -> HandlerResult {
    settle(services.participant_service.confirm_attendance(event).await).map(drop)
}

/// Handle `leave`
pub async fn handle_leave(services: &ServiceFactory, event: EventId) -> HandlerResult {
    settle(services.participant_service.leave_event(event).await).map(drop)
}
