use anyhow::{Context, Result};
use calview_core::settings::Settings;
use tracing::debug;

/// Password from the configured environment variable, or prompted for.
pub fn get_password(settings: &Settings) -> Result<String> {
    if let Ok(password) = std::env::var(&settings.password_env_variable)
        && !password.is_empty()
    {
        debug!(variable = %settings.password_env_variable, "Using password from environment");
        return Ok(password);
    }

    let prompt = format!("Password for {}: ", settings.user);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}
