//! Calendar files on disk.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::directory::SubGroup;
use crate::error::PlancalResult;
use crate::event::ClassEvent;
use crate::ics::generate_ics;

/// Writes `<dir>/<id>.ics`, replacing whatever was there.
pub struct CalendarWriter {
    dir: PathBuf,
}

impl CalendarWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CalendarWriter { dir: dir.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.ics"))
    }

    pub fn ensure_dir(&self) -> PlancalResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn write(
        &self,
        sub_group: &SubGroup,
        events: &[ClassEvent],
        stamp: DateTime<Utc>,
    ) -> PlancalResult<PathBuf> {
        let path = self.path_for(&sub_group.id);
        std::fs::write(&path, generate_ics(sub_group, events, stamp))?;
        Ok(path)
    }
}
