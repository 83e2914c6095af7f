//! Message intake and dispatch for recbot.
//!
//! This crate turns the Telegram update stream into replies:
//!
//! - [`filter`] decides which updates the bot answers
//! - [`classify`] picks the pipeline for a message
//! - [`MessageProcessor`] records each accepted message, acknowledges it and
//!   runs the pipeline on a bounded pool of background tasks
//! - [`ReplySender`] is the seam to the chat platform
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use command_runner::{CommandRunner, CommandSet};
//! use database::Database;
//! use message_listener::{MessageProcessor, ProcessorConfig};
//! use telegram_client::{BotConfig, TelegramClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite:recbot.db?mode=rwc").await?;
//! db.ensure_schema().await?;
//!
//! let client = TelegramClient::connect(BotConfig::new("123456:ABC-DEF")).await?;
//! let identity = client.me().display_identity();
//! let updates = telegram_client::subscribe(&client);
//!
//! let processor = MessageProcessor::new(
//!     Arc::new(client),
//!     db,
//!     CommandRunner::default(),
//!     Some(CommandSet::new("curl -s {url} | llm -s 'Summarize'", "llm")),
//!     identity,
//!     ProcessorConfig::default(),
//! );
//! processor.run(updates).await?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod filter;
mod processor;
mod sender;

pub use processor::{MessageProcessor, ProcessResult, ProcessorConfig, ProcessorError};
pub use sender::ReplySender;

/// Re-export commonly used types for convenience.
pub use telegram_client::{Chat, Message, MessageEntity, Update, User};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
