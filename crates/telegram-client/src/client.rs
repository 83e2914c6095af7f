//! Bot API HTTP client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::TelegramError;
use crate::types::{
    split_text, GetUpdatesParams, Message, SendMessageParams, Update, User, MAX_MESSAGE_UNITS,
};

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T, TelegramError> {
        if !self.ok {
            return Err(TelegramError::Api {
                code: self.error_code.unwrap_or(-1),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
                retry_after: self
                    .parameters
                    .and_then(|p| p.retry_after)
                    .map(Duration::from_secs),
            });
        }
        self.result
            .ok_or_else(|| TelegramError::EmptyResult(method.to_string()))
    }
}

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: BotConfig,
    me: User,
}

impl TelegramClient {
    /// Connect to the Bot API and resolve the bot's own account.
    pub async fn connect(config: BotConfig) -> Result<Self, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TelegramError::Http)?;

        let mut client = Self {
            http,
            config,
            me: User::default(),
        };
        client.me = client.get_me().await?;
        info!(
            "Connected to Bot API at {} as {} (id={})",
            client.config.api_url,
            client.me.display_identity(),
            client.me.id
        );

        Ok(client)
    }

    /// The bot account resolved at connect time.
    pub fn me(&self) -> &User {
        &self.me
    }

    /// Ask the Bot API for the bot account.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        debug!("Bot API call: getMe");
        let response = self
            .http
            .get(self.config.method_url("getMe"))
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;
        read_envelope(response, "getMe").await
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdatesParams {
            offset,
            timeout: timeout.as_secs(),
        };
        call(&self.http, &self.config, "getUpdates", &params).await
    }

    /// Send a message using the full params structure.
    pub async fn send(&self, params: SendMessageParams) -> Result<Message, TelegramError> {
        call(&self.http, &self.config, "sendMessage", &params).await
    }

    /// Send a text message to a chat.
    ///
    /// Text longer than one message allows is sent as several messages.
    /// Returns the last message sent.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        let mut chunks = split_text(text, MAX_MESSAGE_UNITS).into_iter().peekable();
        loop {
            let chunk = chunks.next().unwrap_or_default();
            let sent = self.send(SendMessageParams::text(chat_id, chunk)).await?;
            if chunks.peek().is_none() {
                return Ok(sent);
            }
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .field("me", &self.me.display_identity())
            .finish()
    }
}

/// Call a Bot API method with a JSON body.
async fn call<P: Serialize, R: for<'de> Deserialize<'de>>(
    http: &Client,
    config: &BotConfig,
    method: &str,
    params: &P,
) -> Result<R, TelegramError> {
    debug!("Bot API call: {}", method);

    let response = http
        .post(config.method_url(method))
        .json(params)
        .send()
        .await
        .map_err(|e| TelegramError::Http(e.without_url()))?;
    read_envelope(response, method).await
}

async fn read_envelope<R: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    method: &str,
) -> Result<R, TelegramError> {
    // The API reports failures in the body with a non-2xx status, so the
    // envelope is parsed regardless of status.
    let body = response
        .text()
        .await
        .map_err(|e| TelegramError::Http(e.without_url()))?;
    debug!("Bot API response for {}: {}", method, body);

    let envelope: ApiResponse<R> = serde_json::from_str(&body)?;
    envelope.into_result(method)
}
