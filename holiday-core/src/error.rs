//! Error types for holiday-notifier.

use thiserror::Error;

/// Errors that can occur while fetching, evaluating or persisting holidays.
#[derive(Error, Debug)]
pub enum HolidayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for holiday operations.
pub type HolidayResult<T> = Result<T, HolidayError>;
