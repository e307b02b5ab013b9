//! Error types for Dermabot.
//!
//! Storage and engine crates define their own error enums; this one covers
//! configuration and the shared data model, and carries recovery hints for
//! the CLI.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Dermabot.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required credential missing at startup
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Get a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::Config(_) => Some("Check dermabot.toml or the DERMABOT_* environment variables"),
            Error::MissingCredential(_) => Some("Set BOT_TOKEN in the environment or bot.token in dermabot.toml"),
            Error::NotFound(_) => Some("Use 'dermabot sections list' to see available sections"),
            _ => None,
        }
    }
}

/// Format an error with its recovery suggestion.
pub fn format_error_with_suggestion(error: &Error) -> String {
    let mut output = error.to_string();
    if let Some(suggestion) = error.recovery_suggestion() {
        output.push_str(&format!("\n  Suggestion: {}", suggestion));
    }
    output
}
