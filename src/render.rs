//! TUI rendering traits for plancal types.
//!
//! Extension traits that add colored terminal rendering to plancal-core types
//! using owo_colors.

use owo_colors::OwoColorize;
use plancal_core::{ClassEvent, Group, RunReport, SubGroup};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Group {
    fn render(&self) -> String {
        format!("📚 {}", self.name)
    }
}

impl Render for SubGroup {
    fn render(&self) -> String {
        format!("{} {}", self.name, format!("#{}", self.id).dimmed())
    }
}

impl Render for ClassEvent {
    fn render(&self) -> String {
        let time = format!(
            "{} → {} UTC",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        );
        let location = self.location.as_deref().unwrap_or("");

        format!("{} {} {}", time.cyan(), self.title(), location.dimmed())
    }
}

impl Render for RunReport {
    fn render(&self) -> String {
        format!(
            "Generated {} calendars ({} events), skipped {}",
            self.generated.green(),
            self.events,
            self.skipped.yellow()
        )
    }
}
