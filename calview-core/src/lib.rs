//! Core of calview.
//!
//! This crate turns calendar data into a plain-text agenda:
//! - `rrule` parses recurrence rules and renders them as English phrases
//! - `ics` and `event` turn fetched VEVENTs into `Event` records
//! - `occurrence`, `select` and `date_range` decide what lands in the window
//! - `template`, `format` and `settings` produce the final text

pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod format;
pub mod ics;
pub mod occurrence;
pub mod rrule;
pub mod select;
pub mod settings;
pub mod template;

pub use error::{CalviewError, CalviewResult};
pub use event::{Event, EventTime};
