//! Event command handlers

use chrono::Local;
use tracing::debug;

use super::{CreateEventArgs, EventCommand, EventList, UpdateEventArgs};
use crate::handlers::output::{event_line, print_event_details, print_events, print_json, settle};
use crate::handlers::HandlerResult;
use crate::models::{Access, EventDraft, EventId, EventState, UpdateEventRequest};
use crate::services::{available_actions, current_user_id, derive_access, ServiceFactory, ServiceResponse};

/// Handle `events`: both dashboard lists, loaded concurrently
pub async fn handle_dashboard(services: &ServiceFactory, json: bool) -> HandlerResult {
    let dashboard = services.event_service.dashboard().await;

    if json {
        print_json(&serde_json::json!({
            "myEvents": dashboard.my_events.data(),
            "publicEvents": dashboard.public_events.data(),
        }));
    } else {
        print_events("My events", &dashboard.my_events);
        println!();
        print_events("Public events", &dashboard.public_events);
    }

    // Only an expired session fails the command; a single list may be missing.
    for list in [&dashboard.my_events, &dashboard.public_events] {
        if let ServiceResponse::Failure(failure) = list {
            if failure.should_redirect {
                return Err(failure.clone());
            }
        }
    }
    Ok(())
}

/// Handle `list <kind>`
pub async fn handle_list(services: &ServiceFactory, kind: EventList, json: bool) -> HandlerResult {
    let events = &services.event_service;
    let (title, response) = match kind {
        EventList::Public => ("Public events", events.public_events().await),
        EventList::Mine => ("My events", events.my_events().await),
        EventList::All => ("All my events", events.all_my_events().await),
        EventList::Participating => ("Participating", events.participating_events().await),
        EventList::Next => ("Next events", events.next_events().await),
    };

    if json {
        let list = settle(response)?;
        print_json(&list);
        return Ok(());
    }
    if let ServiceResponse::Failure(failure) = &response {
        return Err(failure.clone());
    }
    print_events(title, &response);
    Ok(())
}

/// Handle `event <subcommand>`
pub async fn handle_event(services: &ServiceFactory, cmd: EventCommand, json: bool) -> HandlerResult {
    let events = &services.event_service;
    match cmd {
        EventCommand::Show { id, fresh } => handle_show(services, &id, fresh, json).await,
        EventCommand::Create(args) => handle_create(services, args).await,
        EventCommand::Update(args) => handle_update(services, args).await,
        EventCommand::Start { id } => handle_transition(services, id, EventState::Active).await,
        EventCommand::Finish { id } => handle_transition(services, id, EventState::Finished).await,
        EventCommand::Cancel { id } => handle_transition(services, id, EventState::Canceled).await,
        EventCommand::Delete { id } => settle(events.delete_event(id).await),
        EventCommand::Invite { id, email, username } => {
            if email.is_some() || username.is_some() {
                settle(services.participant_service.invite_participant(id, email, username).await)?;
                return Ok(());
            }
            let link = settle(events.generate_invite_link(id).await)?;
            println!("{}", link.invite_url.as_deref().unwrap_or(&link.invite_token));
            Ok(())
        }
        EventCommand::Code { id } => {
            let code = settle(events.generate_event_code(id).await)?;
            println!("{}", code);
            Ok(())
        }
        EventCommand::Check { invite, code } => {
            let details = match (invite, code) {
                (Some(token), _) => settle(events.validate_invite_token(&token).await)?,
                (None, Some(code)) => settle(events.validate_event_code(&code).await)?,
                (None, None) => return Ok(()),
            };
            if !details.is_null() {
                print_json(&details);
            }
            Ok(())
        }
        EventCommand::Photo { id, path } => {
            let image = settle(events.upload_event_photo(id, &path).await)?;
            if let Some(url) = image.image_url {
                println!("{}", url);
            }
            Ok(())
        }
    }
}

async fn handle_show(services: &ServiceFactory, id: &str, fresh: bool, json: bool) -> HandlerResult {
    let event = settle(services.event_service.event_details(id, fresh).await)?;
    let user_id = current_user_id(services.guard().store().as_ref(), None).await;
    let access = derive_access(&event, user_id);
    let actions = available_actions(&event, &access);

    if json {
        print_json(&event);
    } else {
        print_event_details(&event, &access, &actions);
    }
    Ok(())
}

async fn handle_create(services: &ServiceFactory, args: CreateEventArgs) -> HandlerResult {
    let draft = EventDraft {
        name: args.name,
        description: args.description,
        localization: args.location,
        date_fixed_start: Some(args.start_date),
        date_fixed_end: args.end_date,
        time_fixed_start: Some(args.start_time),
        time_fixed_end: Some(args.end_time),
        max_participants: args.max_participants,
        classification: args.classification,
        access: if args.private { Access::Private } else { Access::Public },
    };

    let event = settle(
        services
            .event_service
            .create_event(&draft, Local::now().naive_local())
            .await,
    )?;
    println!("{}", event_line(&event));

    if let (Some(path), Some(id)) = (args.image, event.id) {
        settle(services.event_service.upload_event_image(id, &path).await)?;
    }
    Ok(())
}

async fn handle_update(services: &ServiceFactory, args: UpdateEventArgs) -> HandlerResult {
    let update = UpdateEventRequest {
        name: args.name,
        description: args.description,
        localization: args.location,
        date_fixed_start: args.start_date,
        date_fixed_end: args.end_date,
        time_fixed_start: args.start_time,
        time_fixed_end: args.end_time,
        max_participants: args.max_participants,
        ..Default::default()
    };
    let event = settle(services.event_service.update_event(args.id, &update).await)?;
    println!("{}", event_line(&event));
    Ok(())
}

async fn handle_transition(services: &ServiceFactory, id: EventId, target: EventState) -> HandlerResult {
    let events = &services.event_service;
    // Read the current state so impossible transitions fail without a request.
    let current = events
        .event(id)
        .await
        .into_data()
        .map(|e| e.state)
        .filter(|state| *state != EventState::Unknown);
    debug!(event_id = id.get(), current = ?current, target = %target, "Requesting transition");

    let response = match target {
        EventState::Active => events.start_event(id, current, true).await,
        EventState::Finished => events.finish_event(id, current, true).await,
        _ => events.cancel_event(id, current, true).await,
    };
    if let Some(event) = settle(response)? {
        println!("{}", event_line(&event));
        if event.state.is_terminal() {
            println!("No further transitions are possible for this event.");
        }
    }
    Ok(())
}
