//! Timetable-to-calendar engine for plancal.
//!
//! Pipeline per sub-group:
//! - `fetch` the timetable markup
//! - `extract` table rows
//! - `normalize` local times to UTC and `synthesize` class events
//! - `writer` renders them through `ics` into `<id>.ics`
//!
//! `generator` drives that pipeline over a whole `directory`.

pub mod config;
pub mod directory;
pub mod error;
pub mod event;
pub mod extract;
pub mod fetch;
pub mod generator;
pub mod ics;
pub mod normalize;
pub mod synthesize;
pub mod writer;

pub use config::PlancalConfig;
pub use directory::{Directory, Group, SubGroup};
pub use error::{PlancalError, PlancalResult};
pub use event::ClassEvent;
pub use generator::{Generator, RunObserver, RunReport};
