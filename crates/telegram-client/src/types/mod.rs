//! Bot API data types.

mod send;
mod update;

pub use send::{split_text, GetUpdatesParams, SendMessageParams, MAX_MESSAGE_UNITS};
pub use update::{entity_text, Chat, Message, MessageEntity, Update, User};
