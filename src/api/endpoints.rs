//! Endpoint map and URL building

use std::fmt;
use url::Url;

use crate::utils::errors::{EventSphereError, Result};

/// Logical API routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,

    UserProfile,
    UserUpdateName,
    UserUpdateEmail,
    UserUpdateUsername,
    UserUpdatePassword,
    UserDelete,
    UserPhotoRemove,
    UserPhoto,

    EventCreate,
    EventGet,
    EventEdit,
    EventDelete,
    MyEvents,
    AllMyEvents,
    PublicEvents,
    ParticipatingEvents,
    NextEvents,
    EventStart,
    EventFinish,
    EventCancel,
    InviteGenerate,
    InviteValidate,
    EventCodeGenerate,
    EventCodeValidate,
    EventImage,

    ParticipantInvite,
    ParticipantConfirm,
    ParticipantLeaveEvent,
    ParticipantJoinEvent,
    ParticipantJoinWithInvite,
    ParticipantJoinWithCode,
    ParticipantStatusUpdate,
    ParticipantRemoveFromEvent,
    ParticipantConfirmParticipation,
    ParticipantPromote,
    ParticipantDemote,
    ParticipantQrCode,
    ParticipantAttendanceReport,
    ParticipantEventPresent,
    ParticipantPresence,

    Health,
}

impl Endpoint {
    /// Path template; `{name}` segments are filled from request params
    pub fn template(self) -> &'static str {
        match self {
            Endpoint::Login => "/login/accept",
            Endpoint::Register => "/register/accept",

            Endpoint::UserProfile => "/api/user/get",
            Endpoint::UserUpdateName => "/api/user/update-name",
            Endpoint::UserUpdateEmail => "/api/user/update-email",
            Endpoint::UserUpdateUsername => "/api/user/update-username",
            // Spelled this way by the server
            Endpoint::UserUpdatePassword => "/api/user/update-passowrd",
            Endpoint::UserDelete => "/api/user/delete",
            Endpoint::UserPhotoRemove => "/api/user/remove-photo",
            Endpoint::UserPhoto => "/api/upload/user-photo",

            Endpoint::EventCreate => "/api/event/register",
            Endpoint::EventGet | Endpoint::EventEdit | Endpoint::EventDelete => "/api/event/{eventID}",
            Endpoint::MyEvents => "/api/event/my",
            Endpoint::AllMyEvents => "/api/event/all-my",
            Endpoint::PublicEvents => "/api/event/public",
            Endpoint::ParticipatingEvents => "/api/event/participating",
            Endpoint::NextEvents => "/api/event/next-events",
            Endpoint::EventStart => "/api/event/{eventID}/start",
            Endpoint::EventFinish => "/api/event/{eventID}/finish",
            Endpoint::EventCancel => "/api/event/{eventID}/cancel",
            Endpoint::InviteGenerate => "/api/event/{eventID}/invite",
            Endpoint::InviteValidate => "/api/event/invite/{token}",
            Endpoint::EventCodeGenerate => "/api/event/{eventID}/code",
            Endpoint::EventCodeValidate => "/api/event/validate-code",
            Endpoint::EventImage => "/api/upload/event-image",

            Endpoint::ParticipantInvite => "/api/participant/invite",
            Endpoint::ParticipantConfirm => "/api/participant/confirm",
            Endpoint::ParticipantLeaveEvent => "/api/participant/leave-event",
            Endpoint::ParticipantJoinEvent => "/api/participant/join-event",
            Endpoint::ParticipantJoinWithInvite => "/api/event/join/{token}",
            Endpoint::ParticipantJoinWithCode => "/api/participant/join-with-code",
            Endpoint::ParticipantStatusUpdate => "/api/participant/status/{participantId}",
            Endpoint::ParticipantRemoveFromEvent => "/api/participant/remove/{eventId}/{participantId}",
            Endpoint::ParticipantConfirmParticipation => "/api/participant/confirm/{eventId}/{participantId}",
            Endpoint::ParticipantPromote => "/api/participant/promote/{eventId}/{participantId}",
            Endpoint::ParticipantDemote => "/api/participant/demote/{eventId}/{participantId}",
            Endpoint::ParticipantQrCode => "/api/participant/qr-code/{eventId}",
            Endpoint::ParticipantAttendanceReport => "/api/participant/attendance-report/{eventId}",
            Endpoint::ParticipantEventPresent => "/api/participant/present/{eventId}",
            Endpoint::ParticipantPresence => "/api/participant/presence/{token}",

            Endpoint::Health => "/api/health",
        }
    }

    /// Login and registration never carry or validate a session
    pub fn is_auth(self) -> bool {
        matches!(self, Endpoint::Login | Endpoint::Register)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

/// Ordered request parameters.
///
/// Names matching a `{placeholder}` fill the path; the rest become query
/// parameters. `None` values are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.entries.push((name.to_string(), Some(value.to_string())));
        self
    }

    pub fn with_opt<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        self.entries.push((name.to_string(), value.map(|v| v.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the absolute URL for an endpoint
pub fn build_url(base: &str, endpoint: Endpoint, params: &Params) -> Result<Url> {
    let mut path = endpoint.template().to_string();
    let mut query = Vec::new();

    for (name, value) in &params.entries {
        let placeholder = format!("{{{}}}", name);
        if path.contains(&placeholder) {
            let value = value.as_deref().ok_or_else(|| {
                EventSphereError::InvalidInput(format!("missing value for {} in {}", name, endpoint))
            })?;
            path = path.replace(&placeholder, &urlencoding::encode(value));
        } else if let Some(value) = value {
            query.push((name.as_str(), value.as_str()));
        }
    }

    if let Some(start) = path.find('{') {
        let name = path[start..].split('}').next().unwrap_or_default().trim_start_matches('{');
        return Err(EventSphereError::InvalidInput(format!(
            "missing value for {} in {}",
            name, endpoint
        )));
    }

    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
