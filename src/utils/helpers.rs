//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the client.

use chrono::{NaiveDate, NaiveTime};
use std::path::Path;

/// Prefix of ids assigned locally to events the server has not confirmed yet
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Check whether an id was assigned locally
pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Format an event schedule for display
pub fn format_schedule(
    date_start: Option<NaiveDate>,
    time_start: Option<NaiveTime>,
    date_end: Option<NaiveDate>,
    time_end: Option<NaiveTime>,
) -> String {
    let start = match (date_start, time_start) {
        (Some(d), Some(t)) => format!("{} {}", d.format("%d/%m/%Y"), t.format("%H:%M")),
        (Some(d), None) => d.format("%d/%m/%Y").to_string(),
        _ => return "date to be defined".to_string(),
    };

    match (date_end, time_end) {
        (Some(d), Some(t)) if Some(d) == date_start => format!("{} - {}", start, t.format("%H:%M")),
        (Some(d), Some(t)) => format!("{} - {} {}", start, d.format("%d/%m/%Y"), t.format("%H:%M")),
        (None, Some(t)) => format!("{} - {}", start, t.format("%H:%M")),
        _ => start,
    }
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Convert bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Guess an image MIME type from a file extension
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
