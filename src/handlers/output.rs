//! Rendering helpers for the command line

use serde::Serialize;

use crate::models::{AttendanceEntry, AttendanceReport, Event, Participant, PresenceRecord, User};
use crate::services::{EventAccess, EventAction, ServiceFailure, ServiceResponse};
use crate::utils::errors::ErrorCategory;
use crate::utils::helpers::{format_schedule, truncate_text};

const DESCRIPTION_PREVIEW: usize = 60;

/// Print the success message, if any, and hand back the data
pub fn settle<T>(response: ServiceResponse<T>) -> Result<T, ServiceFailure> {
    match response {
        ServiceResponse::Success { data, message } => {
            if let Some(message) = message {
                println!("{}", message);
            }
            Ok(data)
        }
        ServiceResponse::Failure(failure) => Err(failure),
    }
}

/// Process exit status for a failed command
pub fn exit_code(failure: &ServiceFailure) -> u8 {
    match failure.category {
        ErrorCategory::Validation => 2,
        ErrorCategory::Auth => 3,
        ErrorCategory::Permission => 4,
        ErrorCategory::NotFound => 5,
        ErrorCategory::Conflict => 6,
        ErrorCategory::Network => 7,
        ErrorCategory::Server => 1,
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Could not render JSON: {}", e),
    }
}

/// One line per event, for lists
pub fn event_line(event: &Event) -> String {
    let id = event
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let schedule = format_schedule(
        event.date_fixed_start,
        event.time_fixed_start,
        event.date_fixed_end,
        event.time_fixed_end,
    );
    format!(
        "#{:<6} {:<9} {:<32} {}",
        id,
        event.state.as_str(),
        truncate_text(&event.name, 32),
        schedule
    )
}

pub fn print_events(title: &str, response: &ServiceResponse<Vec<Event>>) {
    println!("{}", title);
    match response {
        ServiceResponse::Success { data, .. } if data.is_empty() => println!("  (no events)"),
        ServiceResponse::Success { data, .. } => {
            for event in data {
                println!("  {}", event_line(event));
            }
        }
        ServiceResponse::Failure(failure) => println!("  could not load: {}", failure),
    }
}

pub fn print_event_details(event: &Event, access: &EventAccess, actions: &[EventAction]) {
    println!("{}", event_line(event));
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", truncate_text(description, DESCRIPTION_PREVIEW));
    }
    if let Some(place) = &event.localization {
        println!("  Location:     {}", place);
    }
    println!("  Access:       {}", event.access.unwrap_or_default());
    if let Some(owner) = &event.owner_name {
        println!("  Owner:        {}", owner);
    }
    println!(
        "  Participants: {} ({} confirmed, max {})",
        event.participants.len(),
        event.confirmed_count(),
        event
            .max_participants
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  You:          {}{}{}",
        access.user_status,
        if access.confirmed { ", confirmed" } else { "" },
        if access.can_edit { ", can edit" } else { "" }
    );

    for participant in &event.participants {
        println!("    {}", participant_line(participant));
    }

    if actions.is_empty() {
        println!("  Actions:      none");
    } else {
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        println!("  Actions:      {}", labels.join(", "));
    }
}

fn participant_line(participant: &Participant) -> String {
    let user = participant
        .user_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "user {:<6} {:<24} {:<10}{}",
        user,
        truncate_text(&participant.display_name(), 24),
        participant.attendance_status().as_str(),
        if participant.collaborator() { " collaborator" } else { "" }
    )
}

pub fn presence_line(record: &PresenceRecord) -> String {
    format!(
        "{} ({}){}",
        record.display_name(),
        record.status,
        record
            .scanned_at
            .as_deref()
            .map(|at| format!(" at {}", at))
            .unwrap_or_default()
    )
}

pub fn print_report(report: &AttendanceReport) {
    println!(
        "{} [{}]",
        report.event_name.as_deref().unwrap_or("Event"),
        report.event_state.as_deref().unwrap_or("-")
    );
    println!(
        "  {} participants, {} present, {} absent ({:.1}% attendance)",
        report.total_participants,
        report.present_count,
        report.absent_count,
        report.attendance_rate()
    );
    print_entries("Present", &report.present_participants);
    print_entries("Absent", &report.absent_participants);
}

fn print_entries(title: &str, entries: &[AttendanceEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("  {}:", title);
    for entry in entries {
        println!(
            "    {}{}",
            entry
                .user_name
                .as_deref()
                .or(entry.user_email.as_deref())
                .unwrap_or("Participant"),
            if entry.is_collaborator { " (collaborator)" } else { "" }
        );
    }
}

pub fn print_user(user: &User) {
    println!("{}", user.display_name());
    if let Some(username) = &user.username {
        println!("  Username: {}", username);
    }
    if let Some(email) = &user.email {
        println!("  Email:    {}", email);
    }
    if let Some(id) = user.id {
        println!("  Id:       {}", id);
    }
}
