//! Command handlers module
//!
//! This module defines every `eventsphere` subcommand and dispatches it to
//! the handler in the matching submodule.

pub mod account;
pub mod attendance;
pub mod events;
pub mod participants;
pub mod session;
pub mod status;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::HandlerResult;
use crate::config::Settings;
use crate::models::event::flexible_time;
use crate::models::{EventId, ParticipantStatus, ParticipantId, UserId};
use crate::services::ServiceFactory;
use crate::state::navigation::{HOME_PATH, LOGIN_PATH, REGISTER_PATH};

/// EventSphere command-line client
#[derive(Parser, Debug)]
#[command(name = "eventsphere", version, about = "EventSphere event management client")]
pub struct Cli {
    /// Base URL of the EventSphere API
    #[arg(long, global = true, env = "EVENTSPHERE_API_URL")]
    pub api_url: Option<String>,

    /// Session file location
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Print results as JSON where supported
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// All available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "EVENTSPHERE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "EVENTSPHERE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Reload the profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Manage the account
    #[command(subcommand)]
    Account(AccountCommand),
    /// Show my events and public events
    Events,
    /// List one kind of events
    List {
        #[arg(value_enum, default_value_t = EventList::Public)]
        kind: EventList,
    },
    /// Event operations
    #[command(subcommand)]
    Event(EventCommand),
    /// Manage participants of an event
    #[command(subcommand)]
    Participant(ParticipantCommand),
    /// Join an event
    Join {
        event: EventId,
        /// Invite token of a private event
        #[arg(long, conflicts_with = "code")]
        invite: Option<String>,
        /// Event code
        #[arg(long)]
        code: Option<String>,
    },
    /// Confirm your participation
    Attend { event: EventId },
    /// Leave an event
    Leave { event: EventId },
    /// Show your attendance QR code
    Qr { event: EventId },
    /// Attendance report of an event
    Report { event: EventId },
    /// Mark participants present from scanned tokens
    Scan(ScanArgs),
    /// Check the backend and the session
    Health,
    /// Print the effective configuration
    Config,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventList {
    Public,
    Mine,
    All,
    Participating,
    Next,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventCommand {
    /// Show an event with your access and the available actions
    Show {
        id: String,
        /// Bypass caches
        #[arg(long)]
        fresh: bool,
    },
    /// Create an event
    Create(CreateEventArgs),
    /// Change event fields
    Update(UpdateEventArgs),
    Start { id: EventId },
    Finish { id: EventId },
    Cancel { id: EventId },
    Delete { id: EventId },
    /// Generate an invite link, or invite a user directly
    Invite {
        id: EventId,
        #[arg(long, conflicts_with = "username")]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Generate an event code
    Code { id: EventId },
    /// Check an invite token or an event code
    Check {
        #[arg(long, conflicts_with = "code", required_unless_present = "code")]
        invite: Option<String>,
        #[arg(long)]
        code: Option<String>,
    },
    /// Upload the event image
    Photo { id: EventId, path: PathBuf },
}

#[derive(Args, Debug, Clone)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub start_date: NaiveDate,
    /// HH:MM
    #[arg(long, value_parser = parse_time)]
    pub start_time: NaiveTime,
    /// Defaults to the start date
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// HH:MM
    #[arg(long, value_parser = parse_time)]
    pub end_time: NaiveTime,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub max_participants: Option<i32>,
    #[arg(long)]
    pub classification: Option<i32>,
    #[arg(long)]
    pub private: bool,
    /// Image uploaded after the event is created
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateEventArgs {
    pub id: EventId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_time)]
    pub start_time: Option<NaiveTime>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_time)]
    pub end_time: Option<NaiveTime>,
    #[arg(long)]
    pub max_participants: Option<i32>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ParticipantCommand {
    Promote { event: EventId, user: UserId },
    Demote { event: EventId, user: UserId },
    Remove { event: EventId, user: UserId },
    Confirm { event: EventId, user: UserId },
    /// Set the status of a participant record
    Status {
        participant: ParticipantId,
        #[arg(value_parser = parse_status)]
        status: ParticipantStatus,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommand {
    Name { name: String },
    Email { email: String },
    /// Change the username; you will be logged out
    Username { username: String },
    /// Change the password; you will be logged out
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Upload a profile photo
    Photo { path: PathBuf },
    /// Remove the profile photo
    RemovePhoto,
    /// Delete the account
    Delete {
        #[arg(long, env = "EVENTSPHERE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Preload the participants already present at this event
    #[arg(long)]
    pub event: Option<EventId>,
    /// Read decoded QR text from stdin, one code per line
    #[arg(long, conflicts_with = "tokens")]
    pub stdin: bool,
    /// Tokens typed in by hand
    #[arg(required_unless_present = "stdin")]
    pub tokens: Vec<String>,
}

impl Command {
    /// Screen path the command corresponds to, for redirect decisions
    pub fn path(&self) -> String {
        match self {
            Command::Login { .. } => LOGIN_PATH.to_string(),
            Command::Register { .. } => REGISTER_PATH.to_string(),
            Command::Health | Command::Config => HOME_PATH.to_string(),
            Command::Event(EventCommand::Show { id, .. }) => format!("/events/{}", id),
            Command::Event(EventCommand::Create(_)) => "/events/new".to_string(),
            Command::Scan(_) => "/attendance/scan".to_string(),
            Command::Whoami { .. } | Command::Account(_) => "/profile".to_string(),
            _ => "/events".to_string(),
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    flexible_time::parse(raw).ok_or_else(|| format!("invalid time '{}', expected HH:MM", raw))
}

fn parse_status(raw: &str) -> Result<ParticipantStatus, String> {
    raw.parse()
}

/// Main command dispatcher
pub async fn handle_command(
    command: Command,
    services: &ServiceFactory,
    settings: &Settings,
    json: bool,
) -> HandlerResult {
    match command {
        Command::Login { username, password } => session::handle_login(services, username, password).await,
        Command::Register {
            name,
            username,
            email,
            password,
        } => session::handle_register(services, name, username, email, password).await,
        Command::Logout => session::handle_logout(services).await,
        Command::Whoami { refresh } => session::handle_whoami(services, refresh, json).await,
        Command::Account(cmd) => account::handle_account(services, cmd).await,
        Command::Events => events::handle_dashboard(services, json).await,
        Command::List { kind } => events::handle_list(services, kind, json).await,
        Command::Event(cmd) => events::handle_event(services, cmd, json).await,
        Command::Participant(cmd) => participants::handle_participant(services, cmd).await,
        Command::Join { event, invite, code } => participants::handle_join(services, event, invite, code).await,
        Command::Attend { event } => participants::handle_attend(services, event).await,
        Command::Leave { event } => participants::handle_leave(services, event).await,
        Command::Qr { event } => attendance::handle_qr(services, event, json).await,
        Command::Report { event } => attendance::handle_report(services, event, json).await,
        Command::Scan(args) => attendance::handle_scan(services, settings, args).await,
        Command::Health => status::handle_health(services).await,
        Command::Config => status::handle_config(settings),
    }
}
