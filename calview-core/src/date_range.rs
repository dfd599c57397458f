//! Date window for fetching and filtering events.

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::constants::{CLI_DATE_FORMAT, DATE_FORMAT};
use crate::error::{CalviewError, CalviewResult};

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CalviewResult<Self> {
        if end < start {
            return Err(CalviewError::DateRange(format!(
                "end date {} is before start date {}",
                end.format(DATE_FORMAT),
                start.format(DATE_FORMAT)
            )));
        }
        Ok(DateRange { start, end })
    }

    /// Build the window from command line arguments.
    /// - `start`: DDMMYYYY
    /// - `end`: DDMMYYYY, defaults to `start + day_span` days
    pub fn from_args(start: &str, end: Option<&str>, day_span: u32) -> CalviewResult<Self> {
        let start = parse_cli_date(start)?;
        let end = match end {
            Some(s) => parse_cli_date(s)?,
            None => start
                .checked_add_days(Days::new(u64::from(day_span)))
                .ok_or_else(|| CalviewError::DateRange("day span is out of range".into()))?,
        };
        DateRange::new(start, end)
    }

    /// First moment of the window.
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last second of the window.
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.end.and_hms_opt(23, 59, 59).unwrap_or(self.end.and_time(NaiveTime::MIN))
    }

    pub fn contains(&self, moment: &NaiveDateTime) -> bool {
        *moment >= self.start_datetime() && *moment <= self.end_datetime()
    }

    /// Window start in CalDAV time-range format (`YYYYMMDDTHHMMSSZ`).
    pub fn caldav_start(&self) -> String {
        to_caldav(self.start_datetime())
    }

    /// Window end in CalDAV time-range format (`YYYYMMDDTHHMMSSZ`).
    pub fn caldav_end(&self) -> String {
        to_caldav(self.end_datetime())
    }
}

/// Parse DDMMYYYY, the format of the command line date arguments.
pub fn parse_cli_date(s: &str) -> CalviewResult<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(CalviewError::DateRange(format!(
            "Invalid date '{}'. Expected DDMMYYYY, e.g. 01012020",
            s
        )));
    }
    NaiveDate::parse_from_str(s, CLI_DATE_FORMAT).map_err(|_| {
        CalviewError::DateRange(format!("Invalid date '{}'. Expected DDMMYYYY, e.g. 01012020", s))
    })
}

/// Local wall time to UTC in CalDAV format. Ambiguous times take the earlier
/// instant; times skipped by a DST jump are read as UTC.
fn to_caldav(local: NaiveDateTime) -> String {
    let utc = match Local.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => local.and_utc(),
    };
    utc.format("%Y%m%dT%H%M%SZ").to_string()
}
