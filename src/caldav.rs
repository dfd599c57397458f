//! Minimal CalDAV client: one calendar-query REPORT per run.

use anyhow::{Context, Result, bail};
use calview_core::date_range::DateRange;
use reqwest::{Method, StatusCode};
use tracing::debug;

/// A fetched calendar resource with its ICS data.
#[derive(Debug)]
pub struct CalendarResource {
    pub href: String,
    pub etag: Option<String>,
    pub data: String,
}

pub struct CalDavClient {
    http: reqwest::Client,
    calendar_url: String,
    user: String,
    password: String,
}

impl CalDavClient {
    pub fn new(calendar_url: &str, user: &str, password: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            calendar_url: calendar_url.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    /// Fetch every event resource overlapping `range`, filtered server-side.
    pub async fn fetch_in_range(&self, range: &DateRange) -> Result<Vec<CalendarResource>> {
        let body = calendar_query_body(&range.caldav_start(), &range.caldav_end());
        let report = Method::from_bytes(b"REPORT").context("Invalid HTTP method")?;

        debug!(url = %self.calendar_url, "Sending calendar-query REPORT");

        let response = self
            .http
            .request(report, &self.calendar_url)
            .basic_auth(&self.user, Some(&self.password))
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", self.calendar_url))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                bail!("Access denied ({status}): wrong password or connection settings")
            }
            StatusCode::NOT_FOUND => {
                bail!("Calendar or server not found: {}", self.calendar_url)
            }
            s if !s.is_success() => bail!("CalDAV server answered {status}"),
            _ => {}
        }

        let text = response
            .text()
            .await
            .context("Failed to read CalDAV response")?;
        let resources = parse_calendar_resources(&text)?;

        debug!(count = resources.len(), "Fetched calendar resources");
        Ok(resources)
    }
}

/// calendar-query REPORT body with a VEVENT time-range filter.
///
/// `start` and `end` must be in CalDAV format: `YYYYMMDDTHHMMSSZ`
fn calendar_query_body(start: &str, end: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<C:calendar-query xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <getetag/>
        <C:calendar-data/>
    </prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
            <C:comp-filter name="VEVENT">
                <C:time-range start="{start}" end="{end}"/>
            </C:comp-filter>
        </C:comp-filter>
    </C:filter>
</C:calendar-query>"#
    )
}

/// Pull href, etag and calendar-data out of a multistatus response.
///
/// Responses without calendar data (e.g. the collection itself) are skipped.
fn parse_calendar_resources(text: &str) -> Result<Vec<CalendarResource>> {
    let doc = roxmltree::Document::parse(text).context("Malformed CalDAV response")?;

    let resources = doc
        .root_element()
        .descendants()
        .filter(|n| n.tag_name().name() == "response")
        .filter_map(|response| {
            let href = find_text(response, "href")?;
            let data = find_text(response, "calendar-data")?;
            Some(CalendarResource {
                href,
                etag: find_text(response, "getetag"),
                data,
            })
        })
        .collect();

    Ok(resources)
}

fn find_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.descendants()
        .find(|n| n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(|s| s.to_string())
}
