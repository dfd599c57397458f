use anyhow::{Context, Result};
use calview_core::constants::DATE_FORMAT;
use calview_core::date_range::DateRange;
use calview_core::settings::Settings;
use calview_core::template::Templates;
use calview_core::{Event, format, ics, select};
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};

use crate::caldav::{CalDavClient, CalendarResource};
use crate::password;

pub async fn run(settings: &Settings, templates: &Templates, range: &DateRange) -> Result<()> {
    let password = password::get_password(settings)?;

    eprintln!(
        "{}",
        format!(
            "Fetching events {} to {}, please wait...",
            range.start.format(DATE_FORMAT),
            range.end.format(DATE_FORMAT)
        )
        .dimmed()
    );

    let client = CalDavClient::new(&settings.calendar_url, &settings.user, &password)?;
    let resources = client.fetch_in_range(range).await?;

    let events = select::select_events(parse_resources(&resources), range, &settings.skip_statuses);

    if events.is_empty() {
        info!("No valid events in the window");
        eprintln!("{}", "Done! There are no valid events.".green());
        return Ok(());
    }

    info!(count = events.len(), "Rendering events");
    let output = format::render_output(templates, &events);

    put_out(settings, &output)
}

/// Parse every fetched resource, skipping the ones that aren't valid iCalendar.
fn parse_resources(resources: &[CalendarResource]) -> Vec<Event> {
    resources
        .iter()
        .flat_map(|resource| match ics::parse_events(&resource.data) {
            Ok(events) => {
                debug!(href = %resource.href, etag = ?resource.etag, count = events.len(), "Parsed resource");
                events
            }
            Err(e) => {
                warn!(href = %resource.href, error = %e, "Skipping unparseable resource");
                Vec::new()
            }
        })
        .collect()
}

fn put_out(settings: &Settings, output: &str) -> Result<()> {
    if !settings.output_to_file {
        print!("{output}");
        return Ok(());
    }

    let path = settings.output_path();
    std::fs::write(&path, output)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;

    info!(path = %path.display(), "Wrote output");
    eprintln!("{} {}", "Done! Written to".green(), path.display());
    Ok(())
}
