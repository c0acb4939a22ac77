//! Client-side input validation
//!
//! Validators return human readable messages; an empty list means the
//! input is acceptable. Messages are joined with [`format_validation_errors`]
//! before being surfaced as a single validation failure.

use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{EventDraft, RegisterRequest};

pub const MIN_EVENT_NAME_LENGTH: usize = 3;
pub const MAX_EVENT_NAME_LENGTH: usize = 100;
pub const MIN_LOCALIZATION_LENGTH: usize = 3;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PARTICIPANTS: i32 = 10_000;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// How far in the past a same-day start time may lie
pub const START_TIME_TOLERANCE_MINUTES: i64 = 10;

const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn letters_regex() -> &'static Regex {
    static LETTERS: OnceLock<Regex> = OnceLock::new();
    LETTERS.get_or_init(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s\-']+$").expect("valid letters regex"))
}

/// Validate a new event against the current local time
pub fn validate_event_draft(draft: &EventDraft, now: NaiveDateTime) -> Vec<String> {
    let mut errors = Vec::new();

    let name = draft.name.trim();
    if name.chars().count() < MIN_EVENT_NAME_LENGTH {
        errors.push(format!("Event name must have at least {} characters", MIN_EVENT_NAME_LENGTH));
    } else if name.chars().count() > MAX_EVENT_NAME_LENGTH {
        errors.push(format!("Event name must have at most {} characters", MAX_EVENT_NAME_LENGTH));
    }

    if draft.localization.trim().chars().count() < MIN_LOCALIZATION_LENGTH {
        errors.push(format!("Location must have at least {} characters", MIN_LOCALIZATION_LENGTH));
    }

    match (draft.time_fixed_start, draft.time_fixed_end) {
        (Some(start_time), Some(end_time)) => match draft.date_fixed_start {
            Some(start_date) => {
                let end_date = draft.date_fixed_end.unwrap_or(start_date);
                let today = now.date();

                if start_date < today {
                    errors.push("Events cannot be created for past dates".to_string());
                } else if start_date == today {
                    let earliest = now - Duration::minutes(START_TIME_TOLERANCE_MINUTES);
                    if start_date.and_time(start_time) < earliest {
                        errors.push("Start time cannot be that far in the past".to_string());
                    }
                }

                if end_date == start_date && end_time <= start_time {
                    errors.push("End time must be after the start time".to_string());
                }
                if end_date < start_date {
                    errors.push("End date must not be before the start date".to_string());
                }
            }
            None => errors.push("Start date is required".to_string()),
        },
        _ => errors.push("Start and end times are required".to_string()),
    }

    if let Some(description) = &draft.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(format!("Description must have at most {} characters", MAX_DESCRIPTION_LENGTH));
        }
    }

    if let Some(max) = draft.max_participants {
        if !(1..=MAX_PARTICIPANTS).contains(&max) {
            errors.push(format!("Maximum participants must be between 1 and {}", MAX_PARTICIPANTS));
        }
    }

    errors
}

/// Validate registration data; required fields are checked first
pub fn validate_registration(data: &RegisterRequest) -> Vec<String> {
    let required = [
        (&data.name, "Name is required"),
        (&data.username, "Username is required"),
        (&data.email, "Email is required"),
    ];
    for (value, message) in required {
        if value.trim().is_empty() {
            return vec![message.to_string()];
        }
    }
    if data.password.is_empty() {
        return vec!["Password is required".to_string()];
    }

    let mut errors = Vec::new();
    let username = data.username.trim().chars().count();
    if username < MIN_USERNAME_LENGTH {
        errors.push(format!("Username must have at least {} characters", MIN_USERNAME_LENGTH));
    } else if username > MAX_USERNAME_LENGTH {
        errors.push(format!("Username must have at most {} characters", MAX_USERNAME_LENGTH));
    }
    if !is_valid_email(&data.email) {
        errors.push("Invalid email".to_string());
    }
    if let Some(message) = validate_only_letters(&data.name) {
        errors.push(message);
    }
    if let Some(message) = validate_strong_password(&data.password) {
        errors.push(message);
    }
    errors
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// First unmet strong-password rule, if any
pub fn validate_strong_password(password: &str) -> Option<String> {
    if password.trim().is_empty() {
        return None;
    }
    let message = if password.chars().count() < MIN_PASSWORD_LENGTH {
        "Password must have at least 8 characters"
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        "Password must contain an uppercase letter"
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        "Password must contain a lowercase letter"
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        "Password must contain a number"
    } else if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        "Password must contain a special character"
    } else {
        return None;
    };
    Some(message.to_string())
}

/// Names may contain letters, spaces, hyphens and apostrophes only
pub fn validate_only_letters(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    if !letters_regex().is_match(value) {
        return Some("Name must contain only letters and spaces".to_string());
    }
    if value.contains("  ") {
        return Some("Name cannot contain consecutive spaces".to_string());
    }
    if value.trim() != value {
        return Some("Name cannot start or end with a space".to_string());
    }
    None
}

/// Check an image upload before it is sent
pub fn validate_file(size: u64, mime_type: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();
    if size > MAX_FILE_SIZE {
        errors.push(format!("File too large. Maximum: {}MB", MAX_FILE_SIZE / (1024 * 1024)));
    }
    if !mime_type.map_or(false, |m| ALLOWED_IMAGE_TYPES.contains(&m)) {
        errors.push("Unsupported file type. Use JPEG, PNG, GIF or WebP".to_string());
    }
    errors
}

pub fn format_validation_errors(errors: &[String]) -> String {
    errors.join("; ")
}
