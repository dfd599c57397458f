//! User-editable output templates.
//!
//! Templates live in `~/.config/calview/templates.toml`. The file is written
//! with the defaults on first run; keys missing from it fall back to the
//! defaults. Placeholders are written as `{name}`.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::constants::TEMPLATES_FILE_NAME;
use crate::error::{CalviewError, CalviewResult};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Whole output when there are recurring events. Placeholders: `{events}`, `{recurrent}`
    pub full: String,
    /// Whole output without recurring events. Placeholder: `{events}`
    pub full_without_recurrent: String,
    /// Heading above each day's events. Placeholders: `{weekday}`, `{date}` (DD/MM/YYYY)
    pub day_header: String,
    /// strftime format for the start of timed events
    pub starting_time: String,
    /// Shown instead of a start time for all-day events
    pub starting_all_day: String,
    /// Placeholders: `{starting}`, `{summary}`, `{location}`
    pub event_single: String,
    /// Placeholders: `{recurrence}`, `{starting}`, `{summary}`, `{location}`
    pub event_recurrent: String,
    /// Appended when the event has a description. Placeholder: `{text}`
    pub event_more: String,
    /// Put in front of every further description line
    pub event_more_item_sep: String,
    /// Appended after every event
    pub event_epilog: String,
}

impl Default for Templates {
    fn default() -> Self {
        Templates {
            full: "\nALL EVENTS\n\nOne-off:\n{events}\n\nRecurring:\n{recurrent}\n".into(),
            full_without_recurrent: "\nALL EVENTS\n\nOne-off:\n{events}\n".into(),
            day_header: "\n{weekday}, {date}\n".into(),
            starting_time: "from %H:%M".into(),
            starting_all_day: "all day".into(),
            event_single: "[x] {starting}: {summary}\n[xx] {location}".into(),
            event_recurrent: "[x] {recurrence}, {starting}: {summary}\n[xx] {location}".into(),
            event_more: "\n[xx] more: {text}".into(),
            event_more_item_sep: "[xx]".into(),
            event_epilog: "\n".into(),
        }
    }
}

impl Templates {
    pub fn templates_path() -> CalviewResult<PathBuf> {
        Ok(Settings::config_dir()?.join(TEMPLATES_FILE_NAME))
    }

    /// Load templates from the config directory, writing the defaults first if missing.
    pub fn load() -> CalviewResult<Self> {
        let path = Self::templates_path()?;

        if !path.exists() {
            Self::create_default(&path)?;
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> CalviewResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let templates: Templates = toml::from_str(&content).map_err(|e| {
            CalviewError::Template(format!("Could not parse {}: {}", path.display(), e))
        })?;

        templates.validate()?;
        Ok(templates)
    }

    /// Write the default templates, with a short help header.
    pub fn create_default(path: &Path) -> CalviewResult<()> {
        let body = toml::to_string_pretty(&Templates::default())
            .map_err(|e| CalviewError::Template(e.to_string()))?;
        let contents = format!(
            "\
# calview output templates
#
# Placeholders are written as {{name}}:
#   full                    {{events}} {{recurrent}}
#   full_without_recurrent  {{events}}
#   day_header              {{weekday}} {{date}}
#   event_single            {{starting}} {{summary}} {{location}}
#   event_recurrent         {{recurrence}} {{starting}} {{summary}} {{location}}
#   event_more              {{text}}
# starting_time is a strftime format (e.g. \"from %H:%M\").

{}",
            body
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject a `starting_time` chrono can't format.
    pub fn validate(&self) -> CalviewResult<()> {
        if StrftimeItems::new(&self.starting_time).any(|item| matches!(item, Item::Error)) {
            return Err(CalviewError::Template(format!(
                "starting_time '{}' is not a valid strftime format",
                self.starting_time
            )));
        }
        Ok(())
    }
}

/// Substitute `{name}` placeholders in one pass.
///
/// Unknown placeholders and unmatched braces are kept as written, and
/// substituted values are never scanned again.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after_open[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }

    out.push_str(rest);
    out
}
