//! Row filtering and event construction.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::PlancalResult;
use crate::event::ClassEvent;
use crate::extract::ScheduleRow;
use crate::normalize::{OffsetRule, normalize};

pub struct EventSynthesizer {
    language_class_label: String,
}

impl EventSynthesizer {
    pub fn new(language_class_label: &str) -> Self {
        EventSynthesizer {
            language_class_label: language_class_label.to_string(),
        }
    }

    /// Language classes only belong in the language-center group's calendars.
    pub fn accepts(&self, row: &ScheduleRow, group_is_language_center: bool) -> bool {
        group_is_language_center
            || row.class_type.as_deref() != Some(self.language_class_label.as_str())
    }

    pub fn synthesize(
        &self,
        row: &ScheduleRow,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_is_language_center: bool,
    ) -> Option<ClassEvent> {
        if !self.accepts(row, group_is_language_center) {
            return None;
        }

        Some(ClassEvent {
            subject: row.subject.clone(),
            class_type: row.class_type.clone(),
            start,
            end,
            location: row.location.clone(),
            instructor: row.instructor.clone(),
        })
    }

    /// Filter, normalize and convert rows in table order. The first bad row aborts.
    ///
    /// Filtered rows are dropped before their times are parsed.
    pub fn build_events(
        &self,
        rows: &[ScheduleRow],
        rule: &dyn OffsetRule,
        group_is_language_center: bool,
    ) -> PlancalResult<Vec<ClassEvent>> {
        let mut events = Vec::with_capacity(rows.len());

        for row in rows {
            if !self.accepts(row, group_is_language_center) {
                debug!(row = row.row, "dropping language class outside the language center");
                continue;
            }

            let (start, end) = normalize(row, rule)?;
            events.extend(self.synthesize(row, start, end, group_is_language_center));
        }

        Ok(events)
    }
}
