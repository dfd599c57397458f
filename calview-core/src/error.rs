//! Error types for calview.

use thiserror::Error;

/// Errors that can occur while loading configuration or preparing events.
#[derive(Error, Debug)]
pub enum CalviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Recurrence expansion error: {0}")]
    Recurrence(String),

    #[error("Invalid date range: {0}")]
    DateRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calview operations.
pub type CalviewResult<T> = Result<T, CalviewError>;
