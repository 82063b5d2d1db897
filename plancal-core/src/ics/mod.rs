//! ICS file generation.
//!
//! This module renders class events as RFC 5545 calendars.

mod generate;

pub use generate::generate_ics;
