//! ICS file generation.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike};

use crate::directory::SubGroup;
use crate::event::ClassEvent;

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Generate a whole .ics calendar for one sub-group.
///
/// `stamp` becomes every event's DTSTAMP. UIDs only depend on the sub-group id,
/// the start instant and the event's position.
pub fn generate_ics(sub_group: &SubGroup, events: &[ClassEvent], stamp: DateTime<Utc>) -> String {
    let mut cal = Calendar::new();
    cal.name(&sub_group.name);

    let dtstamp = stamp.format(UTC_FORMAT).to_string();

    for (index, event) in events.iter().enumerate() {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event_uid(&sub_group.id, event, index));
        ics_event.add_property("DTSTAMP", &dtstamp);
        ics_event.summary(&event.title());

        // Instants are always UTC with the Z suffix
        ics_event.add_property("DTSTART", event.start.format(UTC_FORMAT).to_string());
        ics_event.add_property("DTEND", event.end.format(UTC_FORMAT).to_string());

        ics_event.description(&event.description());

        if let Some(ref loc) = event.location {
            ics_event.location(loc);
        }

        cal.push(ics_event.done());
    }

    strip_ics_bloat(&cal.done().to_string())
}

fn event_uid(sub_group_id: &str, event: &ClassEvent, index: usize) -> String {
    format!(
        "{}-{}-{}@plancal",
        sub_group_id,
        event.start.format(UTC_FORMAT),
        index
    )
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with PLANCAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:PLANCAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
