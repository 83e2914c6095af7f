//! Reply transport.

use async_trait::async_trait;
use telegram_client::TelegramClient;

use crate::processor::ProcessorError;

/// Sends text back to a chat.
///
/// Abstracted so the dispatch loop can run against Telegram or a test double.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `text` to the chat identified by `chat_id`.
    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<(), ProcessorError>;
}

#[async_trait]
impl ReplySender for TelegramClient {
    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<(), ProcessorError> {
        self.send_text(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| ProcessorError::Delivery(e.to_string()))
    }
}
