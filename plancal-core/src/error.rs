//! Error types for plancal.

use thiserror::Error;

/// Errors that can occur while generating timetable calendars.
#[derive(Error, Debug)]
pub enum PlancalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Network error fetching '{id}': {message}")]
    Network { id: String, message: String },

    #[error("Markup error: {0}")]
    Markup(String),

    /// The row does not have the layout the timetable table is expected to have.
    #[error("Row {row} does not match the timetable layout: {reason}")]
    RowShape { row: usize, reason: String },

    /// A value is present but could not be parsed.
    #[error("Row {row}: cannot parse '{value}': {source}")]
    Parse {
        row: usize,
        value: String,
        #[source]
        source: ValueError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single cell value failed to parse.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("missing duration marker '(<N>g)'")]
    MissingDuration,

    #[error("malformed duration marker '{0}'")]
    MalformedDuration(String),

    #[error("no HH:MM start time")]
    MissingStartTime,

    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),
}

/// Result type alias for plancal operations.
pub type PlancalResult<T> = Result<T, PlancalError>;
