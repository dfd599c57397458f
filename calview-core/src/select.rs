//! Choosing which fetched events end up in the output.

use tracing::{debug, info};

use crate::date_range::DateRange;
use crate::event::Event;
use crate::occurrence::resolve_start;

/// Resolve recurring starts and drop skippable events, keeping fetch order.
pub fn select_events(events: Vec<Event>, range: &DateRange, skip_statuses: &[String]) -> Vec<Event> {
    events
        .into_iter()
        .filter_map(|event| resolve_start(event, range))
        .filter(|event| {
            let skip = is_skippable(event, range, skip_statuses);
            if !skip {
                debug!(summary = %event.summary, uid = ?event.uid, "Included as valid");
            }
            !skip
        })
        .collect()
}

/// An event is skipped when its STATUS contains one of `skip_statuses`
/// (case-insensitive) or when it starts outside the window.
pub fn is_skippable(event: &Event, range: &DateRange, skip_statuses: &[String]) -> bool {
    if let Some(status) = &event.status {
        let status = status.to_uppercase();
        if skip_statuses
            .iter()
            .any(|skip| status.contains(&skip.to_uppercase()))
        {
            info!(
                summary = %event.summary,
                uid = ?event.uid,
                status = %status,
                "Skipping event, status matched"
            );
            return true;
        }
    }

    if !range.contains(&event.start.to_naive()) {
        info!(
            summary = %event.summary,
            uid = ?event.uid,
            start = %event.start,
            "Skipping event, start is outside the window"
        );
        return true;
    }

    false
}
