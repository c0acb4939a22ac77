//! Event service implementation
//!
//! Event lists, details, creation and editing, lifecycle transitions,
//! invitations and event images.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::multipart::Form;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{image_part, ServiceResponse};
use crate::api::{ApiClient, Endpoint, Params};
use crate::models::{
    ApiResponse, CreateEventRequest, Event, EventDraft, EventId, EventState, InviteLink, UpdateEventRequest,
    UploadedImage,
};
use crate::utils::errors::{ErrorCategory, EventSphereError, Result};
use crate::utils::helpers::is_temporary_id;
use crate::utils::logging::{log_event_action, log_rejected};
use crate::utils::validators::{format_validation_errors, validate_event_draft};

pub const DEFAULT_MAX_PARTICIPANTS: i32 = 50;
pub const DEFAULT_CLASSIFICATION: i32 = 18;

/// The two lists shown on the home screen, loaded independently
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub my_events: ServiceResponse<Vec<Event>>,
    pub public_events: ServiceResponse<Vec<Event>>,
}

/// Event service for managing event operations
#[derive(Clone)]
pub struct EventService {
    client: ApiClient,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn public_events(&self) -> ServiceResponse<Vec<Event>> {
        self.list(Endpoint::PublicEvents, "public_events").await
    }

    pub async fn my_events(&self) -> ServiceResponse<Vec<Event>> {
        self.list(Endpoint::MyEvents, "my_events").await
    }

    pub async fn all_my_events(&self) -> ServiceResponse<Vec<Event>> {
        self.list(Endpoint::AllMyEvents, "all_my_events").await
    }

    pub async fn participating_events(&self) -> ServiceResponse<Vec<Event>> {
        self.list(Endpoint::ParticipatingEvents, "participating_events").await
    }

    /// Upcoming active events, already filtered and sorted by the server
    pub async fn next_events(&self) -> ServiceResponse<Vec<Event>> {
        self.list(Endpoint::NextEvents, "next_events").await
    }

    /// Fetch "my" and public events concurrently; either may fail alone
    pub async fn dashboard(&self) -> Dashboard {
        let (my_events, public_events) = futures::join!(self.my_events(), self.public_events());
        Dashboard {
            my_events,
            public_events,
        }
    }

    async fn list(&self, endpoint: Endpoint, context: &str) -> ServiceResponse<Vec<Event>> {
        ServiceResponse::from_result(self.fetch_list(endpoint).await, context)
    }

    async fn fetch_list(&self, endpoint: Endpoint) -> Result<ServiceResponse<Vec<Event>>> {
        let response = self.client.get(endpoint, &Params::new()).await?;
        let events = response.events()?;
        for event in events.iter().filter(|e| e.id.is_none()) {
            warn!(name = %event.name, endpoint = %endpoint, "Event without id in list");
        }
        debug!(count = events.len(), endpoint = %endpoint, "Events loaded");
        Ok(success(events, &response))
    }

    /// Fetch one event.
    ///
    /// Temporary ids only exist locally and are rejected unless `force_fresh`
    /// is set, which also bypasses caches with a `_t` query parameter.
    pub async fn event_details(&self, id: &str, force_fresh: bool) -> ServiceResponse<Event> {
        let id = id.trim();
        if id.is_empty() || id == "undefined" || id == "null" {
            return ServiceResponse::invalid("Event id missing or invalid");
        }
        if is_temporary_id(id) && !force_fresh {
            log_rejected("event_details", "temporary id");
            return ServiceResponse::failure(ErrorCategory::NotFound, "Temporary event not found");
        }

        ServiceResponse::from_result(self.fetch_details(id, force_fresh).await, "event_details")
    }

    /// Fetch one event by its server id
    pub async fn event(&self, id: EventId) -> ServiceResponse<Event> {
        self.event_details(&id.to_string(), false).await
    }

    async fn fetch_details(&self, id: &str, force_fresh: bool) -> Result<ServiceResponse<Event>> {
        let cache_buster = force_fresh.then(|| Utc::now().timestamp_millis());
        let params = Params::new().with("eventID", id).with_opt("_t", cache_buster);
        let response = self.client.get(Endpoint::EventGet, &params).await?;

        let mut event = response.event()?;
        if event.id.is_none() {
            event.id = id.parse().ok();
        }
        Ok(ServiceResponse::success(event))
    }

    /// Validate a draft and create the event
    pub async fn create_event(&self, draft: &EventDraft, now: NaiveDateTime) -> ServiceResponse<Event> {
        let errors = validate_event_draft(draft, now);
        if !errors.is_empty() {
            log_rejected("create_event", &errors[0]);
            return ServiceResponse::invalid(format_validation_errors(&errors));
        }

        let request = match build_create_request(draft) {
            Some(request) => request,
            None => return ServiceResponse::invalid("Start date and times are required"),
        };

        ServiceResponse::from_result(self.submit_event(&request).await, "create_event")
    }

    async fn submit_event(&self, request: &CreateEventRequest) -> Result<ServiceResponse<Event>> {
        let response = self.client.post(Endpoint::EventCreate, &Params::new(), request).await?;
        let event = response.event()?;
        if let Some(id) = event.id {
            log_event_action(id.get(), "created", None, Some(&request.name));
        }
        Ok(ServiceResponse::with_message(event, response.message_or("Event created")))
    }

    pub async fn update_event(&self, id: EventId, update: &UpdateEventRequest) -> ServiceResponse<Event> {
        let result = async {
            let params = Params::new().with("eventID", id);
            let response = self.client.put(Endpoint::EventEdit, &params, update).await?;
            let mut event = response.event()?;
            event.id.get_or_insert(id);
            log_event_action(id.get(), "updated", None, None);
            Ok::<_, EventSphereError>(ServiceResponse::with_message(event, response.message_or("Event updated")))
        };
        ServiceResponse::from_result(result.await, "update_event")
    }

    pub async fn delete_event(&self, id: EventId) -> ServiceResponse<()> {
        self.action(Endpoint::EventDelete, id, "deleted", "Event deleted").await
    }

    /// Start an event; `current` is checked locally when known
    pub async fn start_event(&self, id: EventId, current: Option<EventState>, refetch: bool) -> ServiceResponse<Option<Event>> {
        self.transition(id, current, EventState::Active, refetch).await
    }

    pub async fn finish_event(&self, id: EventId, current: Option<EventState>, refetch: bool) -> ServiceResponse<Option<Event>> {
        self.transition(id, current, EventState::Finished, refetch).await
    }

    pub async fn cancel_event(&self, id: EventId, current: Option<EventState>, refetch: bool) -> ServiceResponse<Option<Event>> {
        self.transition(id, current, EventState::Canceled, refetch).await
    }

    /// Ask the server to move an event to `target`.
    ///
    /// Local state is never changed here; with `refetch` the event is read
    /// back after the server accepted the transition.
    async fn transition(
        &self,
        id: EventId,
        current: Option<EventState>,
        target: EventState,
        refetch: bool,
    ) -> ServiceResponse<Option<Event>> {
        if let Some(from) = current {
            if !from.can_transition_to(target) {
                let err = EventSphereError::InvalidStateTransition {
                    from: from.to_string(),
                    to: target.to_string(),
                };
                log_rejected("event_transition", &err.to_string());
                return ServiceResponse::invalid(err.user_message());
            }
        }

        let (endpoint, action, default_message) = match target {
            EventState::Active => (Endpoint::EventStart, "started", "Event started"),
            EventState::Finished => (Endpoint::EventFinish, "finished", "Event finished"),
            _ => (Endpoint::EventCancel, "canceled", "Event canceled"),
        };

        let params = Params::new().with("eventID", id);
        let message = match self.client.put_empty(endpoint, &params).await {
            Ok(response) => response.message_or(default_message),
            Err(e) => return ServiceResponse::from_error(&e, action),
        };
        log_event_action(id.get(), action, None, None);

        if !refetch {
            return ServiceResponse::with_message(None, message);
        }
        match self.event(id).await {
            ServiceResponse::Success { data, .. } => ServiceResponse::with_message(Some(data), message),
            ServiceResponse::Failure(failure) => {
                warn!(event_id = id.get(), reason = %failure, "Refetch after transition failed");
                ServiceResponse::with_message(None, message)
            }
        }
    }

    async fn action(&self, endpoint: Endpoint, id: EventId, action: &str, default_message: &str) -> ServiceResponse<()> {
        let params = Params::new().with("eventID", id);
        match self.client.delete(endpoint, &params).await {
            Ok(response) => {
                log_event_action(id.get(), action, None, None);
                ServiceResponse::with_message((), response.message_or(default_message))
            }
            Err(e) => ServiceResponse::from_error(&e, action),
        }
    }

    pub async fn generate_invite_link(&self, id: EventId) -> ServiceResponse<InviteLink> {
        let result = async {
            let params = Params::new().with("eventID", id);
            let response = self.client.get(Endpoint::InviteGenerate, &params).await?;
            let link = response.invite_link()?;
            Ok::<_, EventSphereError>(ServiceResponse::with_message(link, response.message_or("Invite link generated")))
        };
        ServiceResponse::from_result(result.await, "generate_invite_link")
    }

    /// Check an invite token; returns the event data the server attaches
    pub async fn validate_invite_token(&self, token: &str) -> ServiceResponse<Value> {
        let params = Params::new().with("token", token);
        match self.client.get(Endpoint::InviteValidate, &params).await {
            Ok(response) => {
                let data = response.data().cloned().unwrap_or(Value::Null);
                ServiceResponse::with_message(data, response.message_or("Valid invite"))
            }
            Err(e) => ServiceResponse::from_error(&e, "validate_invite_token"),
        }
    }

    pub async fn generate_event_code(&self, id: EventId) -> ServiceResponse<String> {
        let params = Params::new().with("eventID", id);
        match self.client.get(Endpoint::EventCodeGenerate, &params).await {
            Ok(response) => match response.event_code() {
                Some(code) => ServiceResponse::with_message(code, response.message_or("Event code generated")),
                None => ServiceResponse::from_error(
                    &EventSphereError::InvalidResponse("no event code in response".to_string()),
                    "generate_event_code",
                ),
            },
            Err(e) => ServiceResponse::from_error(&e, "generate_event_code"),
        }
    }

    pub async fn validate_event_code(&self, code: &str) -> ServiceResponse<Value> {
        let params = Params::new().with("eventCode", code.trim());
        match self.client.get(Endpoint::EventCodeValidate, &params).await {
            Ok(response) => {
                let data = response.data().cloned().unwrap_or(Value::Null);
                ServiceResponse::with_message(data, response.message_or("Valid code"))
            }
            Err(e) => ServiceResponse::from_error(&e, "validate_event_code"),
        }
    }

    /// Upload an event image; returns the URL the server stored
    pub async fn upload_event_image(&self, id: EventId, path: &Path) -> ServiceResponse<UploadedImage> {
        ServiceResponse::from_result(self.upload(id, path, None).await, "upload_event_image")
    }

    /// Upload an event photo; also reports the stored file name
    pub async fn upload_event_photo(&self, id: EventId, path: &Path) -> ServiceResponse<UploadedImage> {
        ServiceResponse::from_result(self.upload(id, path, Some("Event photo uploaded")).await, "upload_event_photo")
    }

    async fn upload(&self, id: EventId, path: &Path, server_message: Option<&str>) -> Result<ServiceResponse<UploadedImage>> {
        let form = Form::new()
            .part("image", image_part(path).await?)
            .text("eventID", id.to_string());
        let response = self.client.upload(Endpoint::EventImage, &Params::new(), form).await?;
        let image = response.uploaded_image();
        info!(event_id = id.get(), url = ?image.image_url, "Event image uploaded");

        let message = match server_message {
            Some(default) => response.message_or(default),
            None => "Image uploaded".to_string(),
        };
        Ok(ServiceResponse::with_message(image, message))
    }
}

/// Apply defaults to a validated draft; `None` when the schedule is incomplete
pub fn build_create_request(draft: &EventDraft) -> Option<CreateEventRequest> {
    let date_fixed_start: NaiveDate = draft.date_fixed_start?;
    Some(CreateEventRequest {
        name: draft.name.trim().to_string(),
        date_fixed_start,
        date_fixed_end: draft.date_fixed_end.unwrap_or(date_fixed_start),
        time_fixed_start: draft.time_fixed_start?,
        time_fixed_end: draft.time_fixed_end?,
        localization: draft.localization.trim().to_string(),
        description: draft
            .description
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        max_participants: draft.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
        classification: draft.classification.unwrap_or(DEFAULT_CLASSIFICATION),
        access: draft.access,
        photo: None,
    })
}

fn success<T>(data: T, response: &ApiResponse) -> ServiceResponse<T> {
    ServiceResponse::Success {
        data,
        message: response.message(),
    }
}
