use tracing::{debug, warn};

use super::vocab::TRANSLATED_KEYS;

/// A recurrence rule as received from the calendar store, with its parsed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    raw: String,
    parts: Vec<(String, String)>,
}

impl RecurrenceRule {
    /// Parse a raw RRULE value.
    ///
    /// Returns `None` for an empty or blank rule: such an event doesn't recur.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        Some(RecurrenceRule {
            raw: raw.to_string(),
            parts: parse_rule(raw),
        })
    }

    /// The rule text exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed `(KEY, value)` pairs in order of appearance, keys uppercased.
    pub fn parts(&self) -> &[(String, String)] {
        &self.parts
    }

    /// Value of a key. `key` must be uppercase.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(k, _)| k.as_str())
    }

    /// Keys present in the rule that don't make it into the phrase (BYDAY, COUNT, ...).
    pub fn untranslated_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|k| !TRANSLATED_KEYS.contains(k))
    }
}

/// Split `KEY1=VAL1;KEY2=VAL2;...` into uppercased keys and raw values.
///
/// Never fails: empty segments, segments without `=` and segments with an
/// empty key are skipped. A key seen twice keeps its first value.
pub fn parse_rule(raw: &str) -> Vec<(String, String)> {
    let mut parts: Vec<(String, String)> = Vec::new();

    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let Some((key, value)) = segment.split_once('=') else {
            warn!(segment, rule = raw, "Skipping malformed RRULE segment (missing '=')");
            continue;
        };

        let key = key.trim().to_ascii_uppercase();
        if key.is_empty() {
            warn!(segment, rule = raw, "Skipping malformed RRULE segment (empty key)");
            continue;
        }

        if parts.iter().any(|(k, _)| *k == key) {
            debug!(key = %key, rule = raw, "Ignoring repeated RRULE key");
            continue;
        }

        parts.push((key, value.trim().to_string()));
    }

    parts
}
