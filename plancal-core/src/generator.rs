//! Batch generation over the whole group directory.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::config::PlancalConfig;
use crate::directory::{Directory, Group, SubGroup};
use crate::error::PlancalResult;
use crate::event::ClassEvent;
use crate::extract::TableExtractor;
use crate::fetch::ScheduleSource;
use crate::normalize::OffsetRule;
use crate::synthesize::EventSynthesizer;
use crate::writer::CalendarWriter;

/// Progress callbacks for [`Generator::run_with`]. All methods default to no-ops.
pub trait RunObserver {
    fn group_started(&mut self, _group: &Group, _is_language_center: bool) {}
    fn sub_group_skipped(&mut self, _sub_group: &SubGroup, _path: &Path) {}
    fn sub_group_started(&mut self, _sub_group: &SubGroup) {}
    fn sub_group_written(&mut self, _sub_group: &SubGroup, _path: &Path, _events: usize) {}
}

impl RunObserver for () {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub generated: usize,
    pub skipped: usize,
    pub events: usize,
}

pub struct Generator<S> {
    source: S,
    extractor: TableExtractor,
    rule: Box<dyn OffsetRule>,
    synthesizer: EventSynthesizer,
    language_center_group: String,
}

impl<S: ScheduleSource> Generator<S> {
    pub fn new(
        source: S,
        extractor: TableExtractor,
        rule: Box<dyn OffsetRule>,
        synthesizer: EventSynthesizer,
        language_center_group: &str,
    ) -> Self {
        Generator {
            source,
            extractor,
            rule,
            synthesizer,
            language_center_group: language_center_group.to_string(),
        }
    }

    pub fn from_config(source: S, config: &PlancalConfig) -> PlancalResult<Self> {
        Ok(Self::new(
            source,
            TableExtractor::new()?.continue_blank_dates(config.continue_blank_dates),
            config.offset_rule()?,
            EventSynthesizer::new(&config.language_class_label),
            &config.language_center_group,
        ))
    }

    pub fn is_language_center(&self, group: &Group) -> bool {
        group.name == self.language_center_group
    }

    /// Fetch one sub-group's timetable and turn it into events, without writing anything.
    pub fn events_for(&self, id: &str, is_language_center: bool) -> PlancalResult<Vec<ClassEvent>> {
        let raw = self.source.fetch(id)?;
        self.events_from_markup(&raw, is_language_center)
    }

    pub fn events_from_markup(
        &self,
        raw: &str,
        is_language_center: bool,
    ) -> PlancalResult<Vec<ClassEvent>> {
        let rows = self.extractor.extract(raw);
        self.synthesizer
            .build_events(&rows, self.rule.as_ref(), is_language_center)
    }

    pub fn run(
        &self,
        directory: &Directory,
        schedules_dir: &Path,
        resume: bool,
    ) -> PlancalResult<RunReport> {
        self.run_with(directory, schedules_dir, resume, &mut ())
    }

    /// Generate `<schedules_dir>/<id>.ics` for every sub-group, in directory order.
    ///
    /// With `resume`, sub-groups whose file already exists are not fetched at all.
    /// The first error stops the run.
    pub fn run_with(
        &self,
        directory: &Directory,
        schedules_dir: &Path,
        resume: bool,
        observer: &mut dyn RunObserver,
    ) -> PlancalResult<RunReport> {
        let writer = CalendarWriter::new(schedules_dir);
        writer.ensure_dir()?;

        let stamp = Utc::now();
        let mut report = RunReport::default();

        for group in &directory.groups {
            let is_language_center = self.is_language_center(group);
            info!(group = %group.name, is_language_center, "processing group");
            observer.group_started(group, is_language_center);

            for sub_group in &group.sub_groups {
                let path = writer.path_for(&sub_group.id);

                if resume && path.exists() {
                    info!(id = %sub_group.id, "skipping, calendar already exists");
                    observer.sub_group_skipped(sub_group, &path);
                    report.skipped += 1;
                    continue;
                }

                observer.sub_group_started(sub_group);
                let events = self.events_for(&sub_group.id, is_language_center)?;
                let path = writer.write(sub_group, &events, stamp)?;
                info!(id = %sub_group.id, events = events.len(), path = %path.display(), "calendar written");

                observer.sub_group_written(sub_group, &path, events.len());
                report.generated += 1;
                report.events += events.len();
            }
        }

        Ok(report)
    }
}
