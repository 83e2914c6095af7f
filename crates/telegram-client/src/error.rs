//! Error types for telegram-client.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Bot API answered with `ok: false`.
    #[error("Bot API error {code}: {description}")]
    Api {
        code: i32,
        description: String,
        /// Set when the API asks us to slow down (HTTP 429).
        retry_after: Option<Duration>,
    },

    /// The Bot API answered `ok: true` without a result.
    #[error("Bot API returned no result for {0}")]
    EmptyResult(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TelegramError {
    /// Delay requested by the server before the next call, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TelegramError::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
