//! Long-polling update stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream};
use tracing::{debug, error, info, warn};

use crate::client::TelegramClient;
use crate::error::TelegramError;
use crate::types::Update;

/// Configuration for retrying failed polls.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive failures (None = infinite).
    pub max_retries: Option<u32>,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }
}

/// A stream of incoming updates.
///
/// Each poll confirms the updates returned by the previous one, so an
/// update is delivered at most once per process lifetime.
pub struct UpdateStream {
    inner: BoxStream<'static, Result<Update, TelegramError>>,
}

struct PollState {
    client: TelegramClient,
    reconnect: ReconnectConfig,
    offset: Option<i64>,
    buffer: VecDeque<Update>,
    failures: u32,
    backoff: Option<Duration>,
    finished: bool,
}

impl UpdateStream {
    /// Create a new update stream from a client.
    pub fn new(client: &TelegramClient) -> Self {
        Self::with_reconnect(client, ReconnectConfig::default())
    }

    /// Create a new update stream with custom retry config.
    pub fn with_reconnect(client: &TelegramClient, reconnect: ReconnectConfig) -> Self {
        info!(
            "Starting long polling (timeout {:?})",
            client.config().poll_timeout
        );

        let state = PollState {
            client: client.clone(),
            reconnect,
            offset: None,
            buffer: VecDeque::new(),
            failures: 0,
            backoff: None,
            finished: false,
        };

        Self {
            inner: Box::pin(stream::unfold(state, next_update)),
        }
    }
}

async fn next_update(
    mut state: PollState,
) -> Option<(Result<Update, TelegramError>, PollState)> {
    loop {
        if let Some(update) = state.buffer.pop_front() {
            return Some((Ok(update), state));
        }
        if state.finished {
            return None;
        }
        if let Some(delay) = state.backoff.take() {
            debug!("Waiting {:?} before polling again", delay);
            tokio::time::sleep(delay).await;
        }

        let timeout = state.client.config().poll_timeout;
        match state.client.get_updates(state.offset, timeout).await {
            Ok(updates) => {
                if state.failures > 0 {
                    info!("Polling recovered after {} failures", state.failures);
                }
                state.failures = 0;
                for update in updates {
                    state.offset = Some(update.update_id + 1);
                    state.buffer.push_back(update);
                }
            }
            Err(e) => {
                let delay = e
                    .retry_after()
                    .unwrap_or_else(|| state.reconnect.delay_for_attempt(state.failures));
                state.failures += 1;
                if state.reconnect.should_retry(state.failures) {
                    warn!("Polling failed ({} in a row): {}", state.failures, e);
                    state.backoff = Some(delay);
                } else {
                    error!("Polling failed {} times, giving up: {}", state.failures, e);
                    state.finished = true;
                }
                return Some((Err(e), state));
            }
        }
    }
}

impl Stream for UpdateStream {
    type Item = Result<Update, TelegramError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Create an update stream from a client.
pub fn subscribe(client: &TelegramClient) -> UpdateStream {
    UpdateStream::new(client)
}

