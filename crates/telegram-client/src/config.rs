//! Configuration types for telegram-client.

use std::fmt;
use std::time::Duration;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default long-poll timeout passed to `getUpdates`.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the Bot API.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token issued by @BotFather.
    pub token: String,
    /// Base URL of the Bot API (override for a local Bot API server).
    pub api_url: String,
    /// How long a single `getUpdates` call may be held open by the server.
    pub poll_timeout: Duration,
}

impl BotConfig {
    /// Create a new configuration for the public Bot API.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Use a different Bot API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the long-poll timeout.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Get the URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// HTTP request timeout. Must outlive a long poll held by the server.
    pub fn request_timeout(&self) -> Duration {
        self.poll_timeout + Duration::from_secs(10)
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}
