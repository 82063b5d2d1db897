//! Normalized class events.

use chrono::{DateTime, Utc};

/// Shown wherever the timetable left a cell blank.
pub const UNKNOWN: &str = "Unknown";

/// A single class with absolute UTC instants. `start < end` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEvent {
    pub subject: Option<String>,
    pub class_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub instructor: Option<String>,
}

impl ClassEvent {
    /// `"<subject> (<class type>)"`
    pub fn title(&self) -> String {
        format!(
            "{} ({})",
            self.subject.as_deref().unwrap_or(UNKNOWN),
            self.class_type.as_deref().unwrap_or(UNKNOWN)
        )
    }

    /// `"Instructor: <instructor>"`
    pub fn description(&self) -> String {
        format!(
            "Instructor: {}",
            self.instructor.as_deref().unwrap_or(UNKNOWN)
        )
    }
}
