use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, warn};

use super::parse::RecurrenceRule;
use super::vocab::{FREQ, Frequency, INTERVAL, UNTIL, UNTIL_DATE_FORMAT, UNTIL_DATETIME_FORMAT};
use crate::constants::DATE_FORMAT;

/// Outcome of rendering one recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRecurrence {
    /// English phrase, e.g. "every 2 weeks until 31/12/2020".
    Translated(String),
    /// The rule could not be translated; holds the raw rule text unchanged.
    Fallback(String),
}

impl RenderedRecurrence {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedRecurrence::Translated(text) | RenderedRecurrence::Fallback(text) => text,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, RenderedRecurrence::Translated(_))
    }
}

impl fmt::Display for RenderedRecurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a rule fell back to its raw text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("rule has no FREQ")]
    MissingFreq,

    #[error("unrecognized FREQ value '{0}'")]
    UnknownFreq(String),

    #[error("INTERVAL '{0}' is not a positive integer")]
    InvalidInterval(String),

    #[error("UNTIL '{0}' is not a valid date")]
    InvalidUntil(String),
}

/// Build the English phrase for FREQ, INTERVAL and UNTIL.
///
/// Other keys are ignored, so a rule like `FREQ=WEEKLY;BYDAY=MO,WE` comes out
/// as "every week": the weekdays are lost from the phrase.
pub fn translate(rule: &RecurrenceRule) -> Result<String, TranslateError> {
    let freq = rule.get(FREQ).ok_or(TranslateError::MissingFreq)?;
    let frequency =
        Frequency::from_value(freq).ok_or_else(|| TranslateError::UnknownFreq(freq.to_string()))?;

    let interval = match rule.get(INTERVAL) {
        Some(value) => parse_interval(value)?,
        None => 1,
    };

    let mut phrase = if interval == 1 {
        format!("every {}", frequency.singular())
    } else {
        format!("every {} {}", interval, frequency.plural())
    };

    if let Some(until) = rule.get(UNTIL) {
        let date =
            parse_until(until).ok_or_else(|| TranslateError::InvalidUntil(until.to_string()))?;
        phrase.push_str(&format!(" until {}", date.format(DATE_FORMAT)));
    }

    Ok(phrase)
}

/// Render a rule, falling back to its raw text when it can't be translated.
///
/// Every call is logged with the rule, its keys and the decision so that
/// under-translated rules can be found in the log afterwards.
pub fn render(rule: &RecurrenceRule) -> RenderedRecurrence {
    let keys: Vec<&str> = rule.keys().collect();

    for key in rule.untranslated_keys() {
        info!(rule = rule.raw(), key, "RRULE key present but not translated");
    }

    match translate(rule) {
        Ok(phrase) => {
            info!(rule = rule.raw(), ?keys, phrase = %phrase, "Translated recurrence rule");
            RenderedRecurrence::Translated(phrase)
        }
        Err(reason) => {
            warn!(
                rule = rule.raw(),
                ?keys,
                reason = %reason,
                "Translation failed, including raw RRULE in output"
            );
            RenderedRecurrence::Fallback(rule.raw().to_string())
        }
    }
}

fn parse_interval(value: &str) -> Result<u32, TranslateError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| TranslateError::InvalidInterval(value.to_string()))
}

/// Date part of an UNTIL value (`YYYYMMDD`, `YYYYMMDDTHHMMSS` or with a trailing `Z`).
///
/// The date is taken as written, no timezone conversion happens.
pub(crate) fn parse_until(value: &str) -> Option<NaiveDate> {
    let value = value.trim().trim_end_matches(['Z', 'z']);

    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, UNTIL_DATETIME_FORMAT) {
        return Some(datetime.date());
    }

    NaiveDate::parse_from_str(value, UNTIL_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn render_raw(raw: &str) -> RenderedRecurrence {
        render(&RecurrenceRule::parse(raw).expect("non-empty rule"))
    }

    #[test]
    fn weekly_with_interval_and_until() {
        assert_eq!(
            render_raw("FREQ=WEEKLY;INTERVAL=2;UNTIL=20201231"),
            RenderedRecurrence::Translated("every 2 weeks until 31/12/2020".into())
        );
    }

    #[test]
    fn daily_without_interval() {
        assert_eq!(
            render_raw("FREQ=DAILY"),
            RenderedRecurrence::Translated("every day".into())
        );
    }

    #[test]
    fn interval_of_one_is_singular() {
        assert_eq!(
            render_raw("FREQ=MONTHLY;INTERVAL=1"),
            RenderedRecurrence::Translated("every month".into())
        );
    }

    #[test]
    fn unknown_freq_falls_back_to_raw() {
        assert_eq!(
            render_raw("FREQ=BOGUS;INTERVAL=2"),
            RenderedRecurrence::Fallback("FREQ=BOGUS;INTERVAL=2".into())
        );
    }

    #[test]
    fn extra_keys_are_ignored() {
        assert_eq!(
            render_raw("FREQ=WEEKLY;BYDAY=MO,WE"),
            RenderedRecurrence::Translated("every week".into())
        );
    }

    #[test]
    fn no_interval_starts_with_singular_noun() {
        for (freq, noun) in [
            ("DAILY", "day"),
            ("WEEKLY", "week"),
            ("MONTHLY", "month"),
            ("YEARLY", "year"),
        ] {
            let rendered = render_raw(&format!("FREQ={freq}"));
            assert!(rendered.is_translated());
            assert!(
                rendered.as_str().starts_with(&format!("every {noun}")),
                "got {rendered}"
            );
        }
    }

    #[test]
    fn interval_above_one_uses_plural_noun() {
        for (freq, noun) in [
            ("DAILY", "days"),
            ("WEEKLY", "weeks"),
            ("MONTHLY", "months"),
            ("YEARLY", "years"),
        ] {
            for n in [2, 3, 10, 52] {
                let rendered = render_raw(&format!("FREQ={freq};INTERVAL={n}"));
                assert!(
                    rendered.as_str().contains(&format!("every {n} {noun}")),
                    "got {rendered}"
                );
            }
        }
    }

    #[test]
    fn until_accepts_compact_date_and_datetime_forms() {
        for until in ["20210305", "20210305T235959", "20210305T235959Z"] {
            let rendered = render_raw(&format!("FREQ=YEARLY;UNTIL={until}"));
            assert_eq!(rendered.as_str(), "every year until 05/03/2021");
        }
    }

    #[test]
    fn lowercase_rule_translates() {
        assert_eq!(
            render_raw("freq=weekly;interval=3").as_str(),
            "every 3 weeks"
        );
    }

    #[test]
    fn missing_freq_falls_back_verbatim() {
        for raw in ["INTERVAL=2", "UNTIL=20201231", "FREQ", " BYDAY=MO ;"] {
            assert_eq!(render_raw(raw), RenderedRecurrence::Fallback(raw.to_string()));
        }
    }

    #[test]
    fn unparsable_until_falls_back() {
        assert_eq!(
            render_raw("FREQ=DAILY;UNTIL=tomorrow"),
            RenderedRecurrence::Fallback("FREQ=DAILY;UNTIL=tomorrow".into())
        );
        assert_eq!(
            render_raw("FREQ=DAILY;UNTIL=20201332").as_str(),
            "FREQ=DAILY;UNTIL=20201332"
        );
    }

    #[test]
    fn invalid_interval_falls_back() {
        for raw in ["FREQ=DAILY;INTERVAL=0", "FREQ=DAILY;INTERVAL=-2", "FREQ=DAILY;INTERVAL=two"] {
            assert_eq!(render_raw(raw), RenderedRecurrence::Fallback(raw.to_string()));
        }
    }

    #[test]
    fn sub_daily_frequency_falls_back() {
        assert!(!render_raw("FREQ=HOURLY;INTERVAL=3").is_translated());
    }

    #[test]
    fn translate_reports_the_reason() {
        let rule = RecurrenceRule::parse("FREQ=BOGUS").unwrap();
        assert_eq!(
            translate(&rule),
            Err(TranslateError::UnknownFreq("BOGUS".into()))
        );

        let rule = RecurrenceRule::parse("INTERVAL=2").unwrap();
        assert_eq!(translate(&rule), Err(TranslateError::MissingFreq));
    }

    #[test]
    fn malformed_segments_do_not_block_translation() {
        assert_eq!(
            render_raw("FREQ=DAILY;garbage;INTERVAL=4").as_str(),
            "every 4 days"
        );
    }

    #[traced_test]
    #[test]
    fn translated_rule_is_logged_with_its_phrase() {
        render_raw("FREQ=WEEKLY;INTERVAL=2;UNTIL=20201231");

        assert!(logs_contain("Translated recurrence rule"));
        assert!(logs_contain("every 2 weeks until 31/12/2020"));
        assert!(!logs_contain("Translation failed"));
    }

    #[traced_test]
    #[test]
    fn fallback_is_logged_with_its_reason() {
        render_raw("FREQ=BOGUS;INTERVAL=2");

        assert!(logs_contain("Translation failed"));
        assert!(logs_contain("unrecognized FREQ value 'BOGUS'"));
    }

    #[traced_test]
    #[test]
    fn untranslated_keys_are_logged() {
        render_raw("FREQ=WEEKLY;BYDAY=MO,WE");

        assert!(logs_contain("RRULE key present but not translated"));
        assert!(logs_contain("BYDAY"));
        assert!(logs_contain("Translated recurrence rule"));
    }
}
