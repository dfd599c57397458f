//! Recurrence rule (RRULE) interpretation.
//!
//! Only FREQ, INTERVAL and UNTIL are translated into English. Everything else
//! is parsed, logged and otherwise ignored. When a rule can't be translated
//! the raw text is shown instead, see [`RenderedRecurrence`].

mod parse;
mod render;
mod vocab;

pub use parse::{RecurrenceRule, parse_rule};
pub use render::{RenderedRecurrence, TranslateError, render, translate};
pub use vocab::{FREQ, Frequency, INTERVAL, TRANSLATED_KEYS, UNTIL};
pub(crate) use vocab::UNTIL_DATETIME_FORMAT;
