use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plancal_core::fetch::{self, HttpScheduleSource};
use plancal_core::{Generator, PlancalConfig};

use crate::render::Render;
use crate::utils::tui::create_spinner;

pub fn run(cfg: &PlancalConfig, id: &str, language_center: bool, file: Option<PathBuf>) -> Result<()> {
    let generator = Generator::from_config(HttpScheduleSource::from_config(cfg)?, cfg)?;

    let events = match file {
        Some(path) => {
            let raw = fetch::read_page(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            generator.events_from_markup(&raw, language_center)?
        }
        None => {
            let spinner = create_spinner(format!("Fetching timetable {id}"));
            let result = generator.events_for(id, language_center);
            spinner.finish_and_clear();
            result?
        }
    };

    println!("📅 {}", id);

    if events.is_empty() {
        println!("   {}", "No classes found".dimmed());
        return Ok(());
    }

    for event in &events {
        println!("   {}", event.render());
    }
    println!("\n{} events", events.len());

    Ok(())
}
