//! Decides which updates the bot answers.

use telegram_client::{entity_text, Message, Update};

/// Check whether an update should be processed.
///
/// Accepts private chats unconditionally and other chats only when the
/// message mentions `bot_identity`. Returns the message on acceptance, or
/// the reason for skipping.
pub fn should_process<'a>(update: &'a Update, bot_identity: &str) -> Result<&'a Message, String> {
    let message = update
        .message
        .as_ref()
        .ok_or_else(|| "no message".to_string())?;

    if is_private(message) || is_mention(message, bot_identity) {
        Ok(message)
    } else {
        Err(format!("not addressed to {}", bot_identity))
    }
}

/// Whether the message was sent in a one-to-one chat.
pub fn is_private(message: &Message) -> bool {
    message.chat.is_private()
}

/// Whether some `@mention` entity in the message names `who`.
///
/// Entities whose span does not fit the text never match.
pub fn is_mention(message: &Message, who: &str) -> bool {
    if who.is_empty() {
        return false;
    }
    let text = message.body();
    message
        .entities
        .iter()
        .filter(|entity| entity.is_mention())
        .filter_map(|entity| entity_text(text, entity))
        .any(|mention| mention.strip_prefix('@').unwrap_or(&mention) == who)
}
