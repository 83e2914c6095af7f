//! Telegram Bot API client library.
//!
//! This crate provides a small Rust client for the Telegram Bot API over
//! HTTPS. It supports:
//!
//! - Resolving the bot's own identity (`getMe`)
//! - Receiving updates via long polling (`getUpdates`) as a [`futures::Stream`]
//! - Sending text messages, split to the platform's length limit
//!
//! # Example
//!
//! ```no_run
//! use telegram_client::{BotConfig, TelegramClient};
//!
//! # async fn example() -> Result<(), telegram_client::TelegramError> {
//! let config = BotConfig::new("123456:ABC-DEF");
//! let client = TelegramClient::connect(config).await?;
//! println!("Logged in as {}", client.me().display_identity());
//!
//! use futures::StreamExt;
//! let mut updates = telegram_client::subscribe(&client);
//! while let Some(result) = updates.next().await {
//!     match result {
//!         Ok(update) => {
//!             if let Some(msg) = update.message {
//!                 client.send_text(msg.chat.id, "pong").await?;
//!             }
//!         }
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod types;

pub use client::TelegramClient;
pub use config::{BotConfig, DEFAULT_API_URL};
pub use error::TelegramError;
pub use poll::{subscribe, ReconnectConfig, UpdateStream};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
