//! Timetable table extraction.
//!
//! The timetable page is a single table: one header row, then one row per class with
//! the columns date, time (with duration marker), subject, class type, instructor,
//! and location. All knowledge of that layout lives here.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{PlancalError, PlancalResult};

/// Minimum number of cells a class row has.
pub const COLUMN_COUNT: usize = 6;

/// One timetable entry as found in the markup.
///
/// Cells that were blank are `None`; the date is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// 1-based row number in the table, header included.
    pub row: usize,
    pub date: String,
    pub time: Option<String>,
    pub subject: Option<String>,
    pub class_type: Option<String>,
    pub instructor: Option<String>,
    pub location: Option<String>,
}

pub struct TableExtractor {
    rows: Selector,
    cells: Selector,
    continue_blank_dates: bool,
}

impl TableExtractor {
    pub fn new() -> PlancalResult<Self> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| PlancalError::Markup(e.to_string()));

        Ok(TableExtractor {
            rows: parse("tr")?,
            cells: parse("td")?,
            continue_blank_dates: false,
        })
    }

    /// Rows with a blank date take the previous row's date instead of being dropped.
    pub fn continue_blank_dates(mut self, enabled: bool) -> Self {
        self.continue_blank_dates = enabled;
        self
    }

    pub fn extract(&self, raw: &str) -> Vec<ScheduleRow> {
        let document = Html::parse_document(raw);
        let mut rows = Vec::new();
        let mut last_date: Option<String> = None;

        // Row 1 is the header
        for (index, tr) in document.select(&self.rows).enumerate().skip(1) {
            let row = index + 1;
            let cells: Vec<String> = tr.select(&self.cells).map(cell_text).collect();

            if cells.len() < COLUMN_COUNT {
                debug!(row, columns = cells.len(), "skipping short row");
                continue;
            }

            let date = if cells[0].is_empty() {
                match (&last_date, self.continue_blank_dates) {
                    (Some(previous), true) => previous.clone(),
                    _ => {
                        debug!(row, "skipping row without a date");
                        continue;
                    }
                }
            } else {
                cells[0].clone()
            };
            last_date = Some(date.clone());

            rows.push(ScheduleRow {
                row,
                time: present(row, "time", &cells[1]),
                subject: present(row, "subject", &cells[2]),
                class_type: present(row, "class type", &cells[3]),
                instructor: present(row, "instructor", &cells[4]),
                location: present(row, "location", &cells[5]),
                date,
            });
        }

        rows
    }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn present(row: usize, column: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        warn!(row, column, "blank timetable cell");
        None
    } else {
        Some(value.to_string())
    }
}
