pub const FREQ: &str = "FREQ";
pub const INTERVAL: &str = "INTERVAL";
pub const UNTIL: &str = "UNTIL";

/// Keys the renderer turns into words. Any other key is reported as untranslated.
pub const TRANSLATED_KEYS: [&str; 3] = [FREQ, INTERVAL, UNTIL];

/// Compact iCalendar forms accepted for UNTIL.
pub(crate) const UNTIL_DATE_FORMAT: &str = "%Y%m%d";
pub(crate) const UNTIL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Recurrence period unit. Sub-daily frequencies are not translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Parse a FREQ value, ignoring case.
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Frequency::Daily => "days",
            Frequency::Weekly => "weeks",
            Frequency::Monthly => "months",
            Frequency::Yearly => "years",
        }
    }
}
