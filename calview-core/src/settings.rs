//! Settings at ~/.config/calview/settings.toml
//!
//! Values can be overridden with `CALVIEW_`-prefixed environment variables
//! (e.g. `CALVIEW_CALENDAR_URL`); command line flags override both.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{CONFIG_DIR_NAME, DEFAULT_DAY_SPAN, SETTINGS_FILE_NAME};
use crate::error::{CalviewError, CalviewResult};

fn default_password_env_variable() -> String {
    "CALVIEW_PASS".to_string()
}

fn default_day_span() -> u32 {
    DEFAULT_DAY_SPAN
}

fn default_output_file() -> PathBuf {
    PathBuf::from("output.txt")
}

fn default_log_file() -> PathBuf {
    Settings::config_dir()
        .map(|dir| dir.join("calview.log"))
        .unwrap_or_else(|_| PathBuf::from("calview.log"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_skip_statuses() -> Vec<String> {
    vec!["CANCELLED".to_string(), "TENTATIVE".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// CalDAV collection to query, e.g. https://cloud.example.org/remote.php/dav/calendars/me/personal/
    #[serde(default)]
    pub calendar_url: String,

    #[serde(default)]
    pub user: String,

    /// Environment variable holding the password; prompted for when unset
    #[serde(default = "default_password_env_variable")]
    pub password_env_variable: String,

    /// Window length in days when no end date is given
    #[serde(default = "default_day_span")]
    pub day_span: u32,

    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    #[serde(default)]
    pub output_to_file: bool,

    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// tracing filter directive, e.g. "info" or "calview=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Events whose STATUS contains one of these are left out
    #[serde(default = "default_skip_statuses")]
    pub skip_statuses: Vec<String>,
}

impl Settings {
    /// ~/.config/calview (or the platform equivalent)
    pub fn config_dir() -> CalviewResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalviewError::Config("Could not determine config directory".into()))?
            .join(CONFIG_DIR_NAME);
        Ok(config_dir)
    }

    pub fn settings_path() -> CalviewResult<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }

    /// Load settings, creating the default settings file on first run.
    pub fn load() -> CalviewResult<Self> {
        let path = Self::settings_path()?;

        if !path.exists() {
            Self::create_default(&path)?;
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> CalviewResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CALVIEW"))
            .build()
            .map_err(|e| CalviewError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| {
                CalviewError::Config(format!(
                    "Corrupt settings file {}: {}. Removing it recreates the defaults.",
                    path.display(),
                    e
                ))
            })
    }

    /// Write a settings file with every option at its default.
    pub fn create_default(path: &Path) -> CalviewResult<()> {
        let contents = format!(
            "\
# calview settings
# Command line flags override these values, and so do CALVIEW_* environment
# variables (e.g. CALVIEW_CALENDAR_URL).

# The CalDAV calendar to query, e.g.
# https://cloud.example.org/remote.php/dav/calendars/me/personal/
calendar_url = \"\"
user = \"\"

# The password is read from this environment variable, or prompted for.
password_env_variable = \"{password_env}\"

# Without --end-date the view covers this many days after the start date.
day_span = {day_span}

output_file = \"{output_file}\"
output_to_file = false

log_to_file = false
log_file = \"{log_file}\"
# trace, debug, info, warn or error
log_level = \"{log_level}\"

# Events whose STATUS contains one of these are not shown.
skip_statuses = [\"CANCELLED\", \"TENTATIVE\"]
",
            password_env = default_password_env_variable(),
            day_span = DEFAULT_DAY_SPAN,
            output_file = default_output_file().display(),
            log_file = default_log_file().display().to_string().replace('\\', "\\\\"),
            log_level = default_log_level(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalviewError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalviewError::Config(format!("Could not write settings file: {e}")))?;

        Ok(())
    }

    /// Report every problem at once instead of failing on the first.
    pub fn validate(&self) -> CalviewResult<()> {
        let mut problems = Vec::new();

        if self.calendar_url.trim().is_empty() {
            problems.push("calendar_url is not set".to_string());
        } else if !(self.calendar_url.starts_with("http://")
            || self.calendar_url.starts_with("https://"))
        {
            problems.push(format!(
                "calendar_url '{}' must start with http:// or https://",
                self.calendar_url
            ));
        }

        if self.user.trim().is_empty() {
            problems.push("user is not set".to_string());
        }

        if self.day_span == 0 {
            problems.push("day_span must be at least 1".to_string());
        }

        if problems.is_empty() {
            return Ok(());
        }

        Err(CalviewError::Config(format!(
            "Wrong configuration:\n  {}",
            problems.join("\n  ")
        )))
    }

    pub fn output_path(&self) -> PathBuf {
        expand_tilde(&self.output_file)
    }

    pub fn log_path(&self) -> PathBuf {
        expand_tilde(&self.log_file)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_settings(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn default_file_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calview").join("settings.toml");

        Settings::create_default(&path).unwrap();
        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.day_span, 14);
        assert_eq!(settings.password_env_variable, "CALVIEW_PASS");
        assert_eq!(settings.log_level, "info");
        assert!(!settings.output_to_file);
        assert_eq!(settings.skip_statuses, vec!["CANCELLED", "TENTATIVE"]);
    }

    #[test]
    fn default_file_needs_connection_details() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        Settings::create_default(&path).unwrap();
        let err = Settings::load_from(&path).unwrap().validate().unwrap_err();

        let message = err.to_string();
        assert!(message.contains("calendar_url is not set"));
        assert!(message.contains("user is not set"));
    }

    #[test]
    fn reads_values_from_file() {
        let (_dir, path) = write_settings(
            r#"
calendar_url = "https://cloud.example.org/remote.php/dav/calendars/me/personal/"
user = "me"
day_span = 7
output_file = "~/agenda.txt"
skip_statuses = ["CANCELLED"]
"#,
        );

        let settings = Settings::load_from(&path).unwrap();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.day_span, 7);
        assert_eq!(settings.skip_statuses, vec!["CANCELLED"]);
        assert!(!settings.output_path().starts_with("~"));
    }

    #[test]
    fn rejects_zero_day_span_and_bad_url() {
        let (_dir, path) = write_settings(
            r#"
calendar_url = "cloud.example.org"
user = "me"
day_span = 0
"#,
        );

        let message = Settings::load_from(&path)
            .unwrap()
            .validate()
            .unwrap_err()
            .to_string();

        assert!(message.contains("must start with http"));
        assert!(message.contains("day_span"));
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let (_dir, path) = write_settings("day_span = \"many\"\n");
        assert!(matches!(
            Settings::load_from(&path),
            Err(CalviewError::Config(_))
        ));
    }
}
