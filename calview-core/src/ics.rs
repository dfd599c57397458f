//! VEVENT extraction from fetched calendar data, using the icalendar crate's parser.

use chrono::{Local, NaiveDateTime, TimeZone};
use icalendar::parser::{Component, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use tracing::{debug, warn};

use crate::error::{CalviewError, CalviewResult};
use crate::event::{Event, EventTime};
use crate::rrule::RecurrenceRule;

const NO_TITLE: &str = "(No title)";

/// Parse all master VEVENTs of an ICS document.
///
/// Instance overrides (VEVENTs with RECURRENCE-ID) are left out, the master
/// event already stands for the whole series. VEVENTs without a usable
/// DTSTART are skipped.
pub fn parse_events(content: &str) -> CalviewResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(CalviewError::IcsParse)?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter(|c| {
            let is_override = c.find_prop("RECURRENCE-ID").is_some();
            if is_override {
                debug!("Skipping recurrence instance override");
            }
            !is_override
        })
        .filter_map(parse_vevent)
        .collect();

    Ok(events)
}

fn parse_vevent(vevent: &Component) -> Option<Event> {
    let summary = text_prop(vevent, "SUMMARY").unwrap_or_else(|| NO_TITLE.to_string());

    let Some(start) = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
    else {
        warn!(summary = %summary, "Skipping event without a valid DTSTART");
        return None;
    };

    let recurrence = vevent
        .find_prop("RRULE")
        .and_then(|p| RecurrenceRule::parse(p.val.as_ref()));

    Some(Event {
        uid: vevent.find_prop("UID").map(|p| p.val.to_string()),
        start,
        summary,
        location: text_prop(vevent, "LOCATION").unwrap_or_default(),
        description: text_prop(vevent, "DESCRIPTION").filter(|d| !d.is_empty()),
        status: vevent
            .find_prop("STATUS")
            .map(|p| p.val.as_ref().trim().to_string()),
        recurrence,
    })
}

/// Read a TEXT property, undoing iCalendar escaping and trimming surrounding newlines.
fn text_prop(vevent: &Component, name: &str) -> Option<String> {
    vevent
        .find_prop(name)
        .map(|p| unescape_text(p.val.as_ref()).trim_matches(['\n', '\r']).trim().to_string())
}

/// Undo TEXT escaping (RFC 5545 3.3.11): `\n`, `\,`, `\;` and `\\`.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Convert icalendar's DatePerhapsTime to local wall-clock time.
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => EventTime::DateTime(match cal_dt {
            CalendarDateTime::Utc(dt) => dt.with_timezone(&Local).naive_local(),
            CalendarDateTime::Floating(naive) => naive,
            CalendarDateTime::WithTimezone { date_time, tzid } => zoned_to_local(date_time, &tzid),
        }),
    }
}

/// Unknown TZIDs keep the wall time as written.
fn zoned_to_local(date_time: NaiveDateTime, tzid: &str) -> NaiveDateTime {
    let Ok(tz) = tzid.parse::<chrono_tz::Tz>() else {
        debug!(tzid, "Unknown TZID, keeping wall time");
        return date_time;
    };

    match tz.from_local_datetime(&date_time).earliest() {
        Some(dt) => dt.with_timezone(&Local).naive_local(),
        None => date_time,
    }
}
