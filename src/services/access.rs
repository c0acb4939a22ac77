//! Access derivation for events
//!
//! Computes what the current user is to an event and which actions the
//! view should offer. The server stays authoritative: nothing here changes
//! event state, it only mirrors it.

use std::fmt;

use crate::models::{Event, EventState, UserId};
use crate::state::SessionStore;

/// Relationship of the current user to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessRole {
    Owner,
    Collaborator,
    Participant,
    Visitor,
}

impl AccessRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessRole::Owner => "owner",
            AccessRole::Collaborator => "collaborator",
            AccessRole::Participant => "participant",
            AccessRole::Visitor => "visitor",
        }
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags derived for one event and one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventAccess {
    pub is_owner: bool,
    pub is_collaborator: bool,
    pub can_edit: bool,
    pub user_status: AccessRole,
    /// The user's participation is confirmed
    pub confirmed: bool,
}

impl EventAccess {
    /// Least-privileged access, used when the user is unknown
    pub fn visitor() -> Self {
        Self {
            is_owner: false,
            is_collaborator: false,
            can_edit: false,
            user_status: AccessRole::Visitor,
            confirmed: false,
        }
    }
}

/// Derive the current user's access to an event.
///
/// An unknown user is a visitor; the server's `canEdit` is only honoured
/// for a known user.
pub fn derive_access(event: &Event, current_user: Option<UserId>) -> EventAccess {
    let user_id = match current_user {
        Some(id) => id,
        None => return EventAccess::visitor(),
    };

    let is_owner = event.owner_id == Some(user_id);
    let participant = event.participant(user_id);
    let is_collaborator = participant.map_or(false, |p| p.collaborator());
    let can_edit = event.can_edit.unwrap_or(is_owner || is_collaborator);

    let user_status = if is_owner {
        AccessRole::Owner
    } else if is_collaborator {
        AccessRole::Collaborator
    } else if participant.is_some() {
        AccessRole::Participant
    } else {
        AccessRole::Visitor
    };

    EventAccess {
        is_owner,
        is_collaborator,
        can_edit,
        user_status,
        confirmed: participant.map_or(false, |p| p.confirmed) || (participant.is_some() && event.user_confirmed),
    }
}

/// Resolve the current user id from the session, then from `fallback`.
///
/// Returns `None` when neither knows the user; that is not an error.
pub async fn current_user_id(store: &dyn SessionStore, fallback: Option<UserId>) -> Option<UserId> {
    store.user().await.and_then(|u| u.id).or(fallback)
}

/// Action the view may offer for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventAction {
    Edit,
    Start,
    Finish,
    Cancel,
    Delete,
    Invite,
    ManageParticipants,
    ConfirmParticipation,
    Leave,
    Join,
    ShowQrCode,
    ScanAttendance,
    AttendanceReport,
}

impl EventAction {
    pub fn label(self) -> &'static str {
        match self {
            EventAction::Edit => "edit",
            EventAction::Start => "start",
            EventAction::Finish => "finish",
            EventAction::Cancel => "cancel",
            EventAction::Delete => "delete",
            EventAction::Invite => "invite",
            EventAction::ManageParticipants => "manage participants",
            EventAction::ConfirmParticipation => "confirm participation",
            EventAction::Leave => "leave",
            EventAction::Join => "join",
            EventAction::ShowQrCode => "show QR code",
            EventAction::ScanAttendance => "scan attendance",
            EventAction::AttendanceReport => "attendance report",
        }
    }
}

/// Actions available for an event in its current state
pub fn available_actions(event: &Event, access: &EventAccess) -> Vec<EventAction> {
    let editor = access.can_edit;
    let participant = access.user_status == AccessRole::Participant;
    let joinable = access.user_status == AccessRole::Visitor && event.is_public();

    let mut actions = Vec::new();
    match event.state {
        EventState::Created => {
            if editor {
                actions.extend([
                    EventAction::Edit,
                    EventAction::Start,
                    EventAction::Cancel,
                    EventAction::Delete,
                    EventAction::Invite,
                    EventAction::ManageParticipants,
                ]);
            }
            if participant && !access.confirmed {
                actions.push(EventAction::ConfirmParticipation);
            }
            if participant {
                actions.push(EventAction::Leave);
            }
            if joinable {
                actions.push(EventAction::Join);
            }
        }
        EventState::Active => {
            if editor {
                actions.extend([
                    EventAction::Finish,
                    EventAction::ScanAttendance,
                    EventAction::ManageParticipants,
                ]);
            }
            if participant {
                actions.push(EventAction::ShowQrCode);
            }
            if joinable {
                actions.push(EventAction::Join);
            }
        }
        EventState::Finished => {
            if editor {
                actions.push(EventAction::AttendanceReport);
            }
        }
        EventState::Canceled | EventState::Unknown => {}
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Access, Participant, StoredUser};
    use crate::state::MemorySessionStore;

    fn participant(user: i64, collaborator: bool) -> Participant {
        Participant {
            user_id: Some(UserId(user)),
            is_collaborator: collaborator,
            ..Default::default()
        }
    }

    fn event(owner: i64, participants: Vec<Participant>) -> Event {
        Event {
            name: "Semana Acadêmica".to_string(),
            owner_id: Some(UserId(owner)),
            state: EventState::Created,
            access: Some(Access::Public),
            participants,
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_wins_regardless_of_participants() {
        let e = event(1, vec![participant(1, false), participant(2, true)]);
        let access = derive_access(&e, Some(UserId(1)));
        assert_eq!(access.user_status, AccessRole::Owner);
        assert!(access.is_owner);
        assert!(access.can_edit);
    }

    #[test]
    fn test_collaborator_can_edit() {
        let e = event(1, vec![participant(2, true)]);
        let access = derive_access(&e, Some(UserId(2)));
        assert_eq!(access.user_status, AccessRole::Collaborator);
        assert!(access.is_collaborator);
        assert!(access.can_edit);
    }

    #[test]
    fn test_plain_participant() {
        let e = event(1, vec![participant(3, false)]);
        let access = derive_access(&e, Some(UserId(3)));
        assert_eq!(access.user_status, AccessRole::Participant);
        assert!(!access.can_edit);
    }

    #[test]
    fn test_absent_user_is_visitor() {
        let e = event(1, vec![participant(3, false)]);
        let access = derive_access(&e, Some(UserId(9)));
        assert_eq!(access.user_status, AccessRole::Visitor);
        assert!(!access.can_edit);
    }

    #[test]
    fn test_server_can_edit_takes_precedence() {
        let mut e = event(1, vec![participant(3, false)]);
        e.can_edit = Some(true);
        assert!(derive_access(&e, Some(UserId(3))).can_edit);

        e.can_edit = Some(false);
        assert!(!derive_access(&e, Some(UserId(1))).can_edit);
    }

    #[test]
    fn test_unknown_user_gets_least_privilege() {
        let mut e = event(1, vec![]);
        e.can_edit = Some(true);
        assert_eq!(derive_access(&e, None), EventAccess::visitor());
    }

    #[tokio::test]
    async fn test_current_user_resolution_order() {
        let store = MemorySessionStore::new();
        assert_eq!(current_user_id(&store, None).await, None);
        assert_eq!(current_user_id(&store, Some(UserId(4))).await, Some(UserId(4)));

        let user = StoredUser {
            id: Some(UserId(7)),
            ..StoredUser::with_username("dani")
        };
        store.set_user(&user).await.unwrap();
        assert_eq!(current_user_id(&store, Some(UserId(4))).await, Some(UserId(7)));
    }

    #[test]
    fn test_actions_follow_state() {
        let mut e = event(1, vec![participant(3, false)]);
        let owner = derive_access(&e, Some(UserId(1)));
        let member = derive_access(&e, Some(UserId(3)));
        let visitor = derive_access(&e, Some(UserId(8)));

        let created = available_actions(&e, &owner);
        assert!(created.contains(&EventAction::Start));
        assert!(created.contains(&EventAction::Cancel));
        assert!(!created.contains(&EventAction::Finish));
        assert_eq!(
            available_actions(&e, &member),
            vec![EventAction::ConfirmParticipation, EventAction::Leave]
        );
        assert_eq!(available_actions(&e, &visitor), vec![EventAction::Join]);

        e.state = EventState::Active;
        let active = available_actions(&e, &owner);
        assert!(active.contains(&EventAction::Finish));
        assert!(active.contains(&EventAction::ScanAttendance));
        assert!(!active.contains(&EventAction::Cancel));
        assert_eq!(available_actions(&e, &member), vec![EventAction::ShowQrCode]);

        e.state = EventState::Finished;
        assert_eq!(available_actions(&e, &owner), vec![EventAction::AttendanceReport]);
        assert!(available_actions(&e, &member).is_empty());

        e.state = EventState::Canceled;
        assert!(available_actions(&e, &owner).is_empty());
    }

    #[test]
    fn test_private_event_is_not_joinable_by_visitors() {
        let mut e = event(1, vec![]);
        e.access = Some(Access::Private);
        let visitor = derive_access(&e, Some(UserId(8)));
        assert!(available_actions(&e, &visitor).is_empty());
    }
}
