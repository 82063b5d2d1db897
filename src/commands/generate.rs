use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use plancal_core::fetch::{FileScheduleSource, HttpScheduleSource, ScheduleSource};
use plancal_core::{Directory, Generator, Group, PlancalConfig, RunObserver, SubGroup};

use crate::render::Render;
use crate::utils::tui::create_spinner;

pub fn run(
    cfg: &PlancalConfig,
    resume: bool,
    directory: Option<PathBuf>,
    out: Option<PathBuf>,
    offline: Option<PathBuf>,
) -> Result<()> {
    let directory_path = directory.unwrap_or_else(|| cfg.directory_path());
    let directory = Directory::load(&directory_path)
        .with_context(|| format!("Failed to load group directory {}", directory_path.display()))?;

    if directory.sub_group_count() == 0 {
        anyhow::bail!(
            "No sub-groups found in {}.\n\
            Collect the group directory first, then run `plancal generate` again.",
            directory_path.display()
        );
    }

    let schedules_dir = out.unwrap_or_else(|| cfg.schedules_path());

    let source: Box<dyn ScheduleSource> = match offline {
        Some(dir) => Box::new(FileScheduleSource::new(dir)),
        None => Box::new(HttpScheduleSource::from_config(cfg)?),
    };
    let generator = Generator::from_config(source, cfg)?;

    let mut progress = Progress::default();
    let result = generator.run_with(&directory, &schedules_dir, resume, &mut progress);
    progress.clear();

    let report = result?;
    println!("\n{}", report.render());

    Ok(())
}

/// Prints one line per sub-group and spins while its timetable is fetched.
#[derive(Default)]
struct Progress {
    spinner: Option<ProgressBar>,
}

impl Progress {
    fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl RunObserver for Progress {
    fn group_started(&mut self, group: &Group, is_language_center: bool) {
        if is_language_center {
            println!("\n{} {}", group.render(), "(language center)".dimmed());
        } else {
            println!("\n{}", group.render());
        }
    }

    fn sub_group_skipped(&mut self, sub_group: &SubGroup, _path: &Path) {
        println!("   {} {} {}", "=".dimmed(), sub_group.render(), "exists, skipped".dimmed());
    }

    fn sub_group_started(&mut self, sub_group: &SubGroup) {
        self.spinner = Some(create_spinner(format!("   {}", sub_group.render())));
    }

    fn sub_group_written(&mut self, sub_group: &SubGroup, path: &Path, events: usize) {
        self.clear();
        println!(
            "   {} {} {}",
            "+".green(),
            sub_group.render(),
            format!("{} events → {}", events, path.display()).dimmed()
        );
    }
}
