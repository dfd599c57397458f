//! Event records handed from the calendar fetch to the formatter.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::DATE_FORMAT;
use crate::rrule::RecurrenceRule;

/// A calendar event, built once per fetched VEVENT and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub uid: Option<String>,
    /// DTSTART, or the next occurrence inside the window for recurring events.
    pub start: EventTime,
    pub summary: String,
    pub location: String,
    /// DESCRIPTION, shown as extra lines below the event
    pub description: Option<String>,
    /// STATUS as written in the calendar (e.g. "CONFIRMED", "TENTATIVE")
    pub status: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
}

/// Start of an event in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// All-day event
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Event {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }

    /// The same event, shown at another start (used for recurring events).
    pub fn starting_at(self, start: EventTime) -> Self {
        Event { start, ..self }
    }
}

impl EventTime {
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTime(dt) => dt.date(),
        }
    }

    /// All-day events start at midnight.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(NaiveTime::MIN),
            EventTime::DateTime(dt) => *dt,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            EventTime::DateTime(dt) => write!(f, "{} {}", dt.format(DATE_FORMAT), dt.format("%H:%M")),
        }
    }
}
