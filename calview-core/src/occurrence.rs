//! Next occurrence of a recurring event inside the date window.
//!
//! Only decides which date a recurring event is listed under. The wording of
//! the recurrence comes from [`crate::rrule::render`] and never depends on this.
//!
//! Expansion runs on local wall-clock times read as UTC. A UTC UNTIL is moved
//! into local time first so it lines up with DTSTART, but DST shifts between
//! occurrences are not applied.

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use rrule::RRuleSet;
use tracing::{debug, info, warn};

use crate::date_range::DateRange;
use crate::error::{CalviewError, CalviewResult};
use crate::event::{Event, EventTime};
use crate::rrule::{RecurrenceRule, UNTIL, UNTIL_DATETIME_FORMAT};

/// RRULE parts the rrule crate accepts. Others (X-* extensions and typos)
/// are left out of the expansion.
const EXPANDABLE_KEYS: [&str; 14] = [
    "FREQ",
    "UNTIL",
    "COUNT",
    "INTERVAL",
    "BYSECOND",
    "BYMINUTE",
    "BYHOUR",
    "BYDAY",
    "BYMONTHDAY",
    "BYYEARDAY",
    "BYWEEKNO",
    "BYMONTH",
    "BYSETPOS",
    "WKST",
];

/// Place an event in the window.
///
/// Non-recurring events are returned unchanged. A recurring event is moved to
/// its first occurrence inside the window, or dropped when it has none. If
/// the rule can't be expanded at all the event is listed on the first day of
/// the window (or at its DTSTART when that is later), so its raw rule still
/// shows up.
pub fn resolve_start(event: Event, range: &DateRange) -> Option<Event> {
    let Some(rule) = &event.recurrence else {
        return Some(event);
    };

    match next_occurrence(rule, &event.start, range) {
        Ok(Some(start)) => {
            debug!(
                summary = %event.summary,
                uid = ?event.uid,
                start = %start,
                "Generated next occurrence"
            );
            Some(event.starting_at(start))
        }
        Ok(None) => {
            info!(
                summary = %event.summary,
                uid = ?event.uid,
                rule = rule.raw(),
                "Skipping recurring event without an occurrence in the window"
            );
            None
        }
        Err(e) => {
            warn!(
                summary = %event.summary,
                uid = ?event.uid,
                rule = rule.raw(),
                error = %e,
                "Could not expand recurrence, listing it at the window start"
            );
            let start = clamp_to_window(event.start, range);
            Some(event.starting_at(start))
        }
    }
}

/// Move a start before the window onto the window's first day, keeping the time of day.
fn clamp_to_window(start: EventTime, range: &DateRange) -> EventTime {
    if start.date() >= range.start {
        return start;
    }
    match start {
        EventTime::Date(_) => EventTime::Date(range.start),
        EventTime::DateTime(dt) => EventTime::DateTime(range.start.and_time(dt.time())),
    }
}

/// First occurrence of `rule` starting at `start` that falls inside `range`.
///
/// Wall-clock times are expanded as if they were UTC, so DST shifts are not
/// applied between occurrences.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    start: &EventTime,
    range: &DateRange,
) -> CalviewResult<Option<EventTime>> {
    let rrule_str = build_rrule_string(rule, start);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        CalviewError::Recurrence(format!("Failed to parse RRULE '{}': {}", rule.raw(), e))
    })?;

    // after/before are exclusive, widen by one second to include the bounds
    let tz: rrule::Tz = Utc.into();
    let after = (range.start_datetime().and_utc() - Duration::seconds(1)).with_timezone(&tz);
    let before = (range.end_datetime().and_utc() + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(1);

    Ok(result
        .dates
        .first()
        .map(|dt| occurrence_to_event_time(dt, start)))
}

/// Build the DTSTART + RRULE text the rrule crate parses.
///
/// Keys come from the already-parsed rule, so malformed segments are gone,
/// and only [`EXPANDABLE_KEYS`] are passed on. Values are uppercased. UNTIL
/// is put in the same frame as DTSTART, date-only values cover the whole day.
fn build_rrule_string(rule: &RecurrenceRule, start: &EventTime) -> String {
    let dtstart = match start {
        EventTime::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTime(dt) => format!("DTSTART:{}Z", dt.format("%Y%m%dT%H%M%S")),
    };

    let parts: Vec<String> = rule
        .parts()
        .iter()
        .filter(|(key, _)| {
            let known = EXPANDABLE_KEYS.contains(&key.as_str());
            if !known {
                debug!(key = %key, "Leaving RRULE key out of the expansion");
            }
            known
        })
        .map(|(key, value)| {
            let value = value.to_ascii_uppercase();
            if key == UNTIL {
                format!("{}={}", key, until_as_utc(&value))
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect();

    format!("{}\nRRULE:{}", dtstart, parts.join(";"))
}

/// DTSTART is local wall time written with a `Z`, so a real UTC UNTIL is
/// converted to local wall time and written the same way.
fn until_as_utc(value: &str) -> String {
    if value.len() == 8 {
        return format!("{}T235959Z", value);
    }

    let Some(utc) = value.strip_suffix('Z') else {
        return format!("{}Z", value);
    };

    match NaiveDateTime::parse_from_str(utc, UNTIL_DATETIME_FORMAT) {
        Ok(dt) => format!(
            "{}Z",
            dt.and_utc()
                .with_timezone(&Local)
                .naive_local()
                .format(UNTIL_DATETIME_FORMAT)
        ),
        Err(_) => value.to_string(),
    }
}

fn occurrence_to_event_time(dt: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTime(_) => EventTime::DateTime(dt.naive_utc()),
    }
}
