/// Human date format used for DTSTART and UNTIL everywhere in the output (DD/MM/YYYY).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format of the start/end date arguments on the command line (DDMMYYYY).
pub const CLI_DATE_FORMAT: &str = "%d%m%Y";

/// Days covered by the window when no end date is given.
pub const DEFAULT_DAY_SPAN: u32 = 14;

/// Name of the directory below the platform config dir.
pub const CONFIG_DIR_NAME: &str = "calview";

pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const TEMPLATES_FILE_NAME: &str = "templates.toml";

