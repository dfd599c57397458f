//! Turning events into the final text, driven by [`Templates`].

use std::fmt::Write;

use chrono::NaiveDate;
use tracing::info_span;

use crate::constants::DATE_FORMAT;
use crate::event::{Event, EventTime};
use crate::rrule;
use crate::template::{Templates, fill};

/// Render the start of an event: `starting_all_day`, or `starting_time` as a strftime format.
pub fn render_starting(templates: &Templates, start: &EventTime) -> String {
    match start {
        EventTime::Date(_) => templates.starting_all_day.clone(),
        EventTime::DateTime(dt) => {
            let mut out = String::new();
            if write!(out, "{}", dt.format(&templates.starting_time)).is_err() {
                return dt.format("%H:%M").to_string();
            }
            out
        }
    }
}

/// Render one event into its text block.
///
/// Recurring events go through `event_recurrent` with the rendered
/// recurrence phrase, or the raw rule when it couldn't be translated.
pub fn render_event(templates: &Templates, event: &Event) -> String {
    let _span = info_span!("event", summary = %event.summary).entered();

    let starting = render_starting(templates, &event.start);

    let mut out = match &event.recurrence {
        Some(rule) => {
            let recurrence = rrule::render(rule);
            fill(
                &templates.event_recurrent,
                &[
                    ("recurrence", recurrence.as_str()),
                    ("starting", &starting),
                    ("summary", &event.summary),
                    ("location", &event.location),
                ],
            )
        }
        None => fill(
            &templates.event_single,
            &[
                ("starting", &starting),
                ("summary", &event.summary),
                ("location", &event.location),
            ],
        ),
    };

    if let Some(description) = &event.description {
        let separator = format!("\n{} ", templates.event_more_item_sep);
        let text = description.trim().lines().collect::<Vec<_>>().join(&separator);
        out.push_str(&fill(&templates.event_more, &[("text", &text)]));
    }

    out.push_str(&templates.event_epilog);
    out
}

/// Render the day heading for `date`.
pub fn render_day_header(templates: &Templates, date: NaiveDate) -> String {
    let weekday = date.format("%a").to_string();
    let formatted = date.format(DATE_FORMAT).to_string();
    fill(
        &templates.day_header,
        &[("weekday", &weekday), ("date", &formatted)],
    )
}

/// Assemble the whole output.
///
/// Events are sorted by start and grouped under a header per day. One-off
/// and recurring events go to separate sections; the `full` template is only
/// used when there is at least one recurring event.
pub fn render_output(templates: &Templates, events: &[Event]) -> String {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.start.to_naive());

    let single: Vec<&Event> = sorted.iter().copied().filter(|e| !e.is_recurring()).collect();
    let recurrent: Vec<&Event> = sorted.iter().copied().filter(|e| e.is_recurring()).collect();

    let single_text = render_section(templates, &single);

    if recurrent.is_empty() {
        return fill(&templates.full_without_recurrent, &[("events", &single_text)]);
    }

    let recurrent_text = render_section(templates, &recurrent);
    fill(
        &templates.full,
        &[("events", &single_text), ("recurrent", &recurrent_text)],
    )
}

/// Events must already be sorted by start.
fn render_section(templates: &Templates, events: &[&Event]) -> String {
    let mut out = String::new();

    for day in events.chunk_by(|a, b| a.start.date() == b.start.date()) {
        out.push_str(&render_day_header(templates, day[0].start.date()));
        let rendered: Vec<String> = day.iter().map(|e| render_event(templates, e)).collect();
        out.push_str(&rendered.join("\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrule::RecurrenceRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(summary: &str, start: EventTime, rrule: Option<&str>) -> Event {
        Event {
            uid: None,
            start,
            summary: summary.into(),
            location: "Town hall".into(),
            description: None,
            status: None,
            recurrence: rrule.and_then(RecurrenceRule::parse),
        }
    }

    #[test]
    fn timed_start_uses_strftime_template() {
        let t = Templates::default();
        let start = EventTime::DateTime(date(2020, 5, 1).and_hms_opt(19, 30, 0).unwrap());
        assert_eq!(render_starting(&t, &start), "from 19:30");
        assert_eq!(render_starting(&t, &EventTime::Date(date(2020, 5, 1))), "all day");
    }

    #[test]
    fn single_event_block() {
        let t = Templates::default();
        let e = event("Concert", EventTime::Date(date(2020, 5, 1)), None);
        assert_eq!(render_event(&t, &e), "[x] all day: Concert\n[xx] Town hall\n");
    }

    #[test]
    fn recurrent_event_embeds_phrase() {
        let t = Templates::default();
        let e = event(
            "Choir",
            EventTime::DateTime(date(2020, 12, 1).and_hms_opt(18, 0, 0).unwrap()),
            Some("FREQ=WEEKLY;INTERVAL=2;UNTIL=20201231"),
        );
        assert_eq!(
            render_event(&t, &e),
            "[x] every 2 weeks until 31/12/2020, from 18:00: Choir\n[xx] Town hall\n"
        );
    }

    #[test]
    fn untranslatable_rule_is_shown_raw() {
        let t = Templates::default();
        let e = event("Odd", EventTime::Date(date(2020, 1, 1)), Some("FREQ=BOGUS;INTERVAL=2"));
        assert!(render_event(&t, &e).starts_with("[x] FREQ=BOGUS;INTERVAL=2, all day: Odd"));
    }

    #[test]
    fn description_lines_are_appended() {
        let t = Templates::default();
        let mut e = event("Market", EventTime::Date(date(2020, 1, 1)), None);
        e.description = Some("Stalls from 8\nBring bags\n".into());
        assert_eq!(
            render_event(&t, &e),
            "[x] all day: Market\n[xx] Town hall\n[xx] more: Stalls from 8\n[xx] Bring bags\n"
        );
    }

    #[test]
    fn day_header_uses_day_month_year() {
        let t = Templates::default();
        assert_eq!(render_day_header(&t, date(2020, 12, 31)), "\nThu, 31/12/2020\n");
    }

    #[test]
    fn output_without_recurring_events() {
        let t = Templates::default();
        let events = vec![
            event("Second", EventTime::Date(date(2020, 1, 2)), None),
            event("First", EventTime::Date(date(2020, 1, 1)), None),
        ];

        let output = render_output(&t, &events);

        assert_eq!(
            output,
            "\nALL EVENTS\n\nOne-off:\n\
             \nWed, 01/01/2020\n[x] all day: First\n[xx] Town hall\n\
             \nThu, 02/01/2020\n[x] all day: Second\n[xx] Town hall\n\n"
        );
        assert!(!output.contains("Recurring:"));
    }

    #[test]
    fn output_with_recurring_section() {
        let t = Templates::default();
        let events = vec![
            event("Weekly", EventTime::Date(date(2020, 1, 1)), Some("FREQ=WEEKLY")),
            event("Once", EventTime::Date(date(2020, 1, 1)), None),
        ];

        let output = render_output(&t, &events);

        let one_off = output.find("One-off:").unwrap();
        let recurring = output.find("Recurring:").unwrap();
        let once = output.find("Once").unwrap();
        let weekly = output.find("every week").unwrap();
        assert!(one_off < once && once < recurring && recurring < weekly);
    }

    #[test]
    fn same_day_events_share_one_header() {
        let t = Templates::default();
        let at = |h| EventTime::DateTime(date(2020, 3, 3).and_hms_opt(h, 0, 0).unwrap());
        let events = vec![event("Late", at(20), None), event("Early", at(8), None)];

        let output = render_output(&t, &events);

        assert_eq!(output.matches("Tue, 03/03/2020").count(), 1);
        assert!(output.find("Early").unwrap() < output.find("Late").unwrap());
    }
}
