mod caldav;
mod commands;
mod logging;
mod password;

use std::path::PathBuf;

use anyhow::{Context, Result};
use calview_core::date_range::DateRange;
use calview_core::settings::Settings;
use calview_core::template::Templates;
use clap::Parser;

#[derive(Parser)]
#[command(name = "calview")]
#[command(about = "Show the events of a CalDAV calendar as a plain-text agenda")]
struct Cli {
    /// First day to show (DDMMYYYY)
    start_date: String,

    /// Last day to show (DDMMYYYY). Defaults to start date + day_span
    #[arg(short, long)]
    end_date: Option<String>,

    /// Write the agenda to this file instead of stdout
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Write logs to this file
    #[arg(short, long, conflicts_with = "log_to_stdout")]
    log_file: Option<PathBuf>,

    /// Write logs to stdout even if log_to_file is set
    #[arg(short = 's', long)]
    log_to_stdout: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,

    /// Log debug messages
    #[arg(short = 'b', long)]
    debug: bool,
}

impl Cli {
    /// Command line flags take precedence over the settings file.
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(path) = &self.output_file {
            settings.output_file = path.clone();
            settings.output_to_file = true;
        }
        if let Some(path) = &self.log_file {
            settings.log_file = path.clone();
            settings.log_to_file = true;
        }
        if self.log_to_stdout {
            settings.log_to_file = false;
        }
        if self.quiet {
            settings.log_level = "warn".into();
        }
        if self.debug {
            settings.log_level = "debug".into();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("Failed to load settings")?;
    cli.apply_to(&mut settings);
    settings.validate()?;

    logging::init(&settings)?;

    let templates = Templates::load().context("Failed to load templates")?;
    let range = DateRange::from_args(&cli.start_date, cli.end_date.as_deref(), settings.day_span)?;

    commands::view::run(&settings, &templates, &range).await
}
