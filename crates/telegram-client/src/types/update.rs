//! Update and message types received from the Bot API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single incoming update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier, used to acknowledge updates via `offset`.
    pub update_id: i64,

    /// New incoming message of any kind. Other update kinds leave it empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// A message.
///
/// Only the fields the relay reads are typed. Everything else the Bot API
/// sends, here and in the nested chat, user and entity objects, is kept in
/// `extra` so that re-serializing yields the full message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier inside its chat.
    pub message_id: i64,

    /// Sender, empty for messages sent to channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    /// Conversation the message belongs to.
    pub chat: Chat,

    /// Date the message was sent (unix time).
    #[serde(default)]
    pub date: i64,

    /// UTF-8 text of the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Caption for media messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Special entities (mentions, URLs, commands) that appear in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,

    /// Remaining fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Text of the message, falling back to the media caption.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or_default()
    }
}

/// A chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: i64,

    /// One of "private", "group", "supergroup" or "channel".
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Title, for groups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Username, for private chats and public groups/channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Remaining fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    /// Whether this is a one-to-one conversation with the bot.
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name other users address this account by.
    ///
    /// The username when one is set, otherwise the first and last name.
    pub fn display_identity(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return username.to_string();
        }
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// A special entity in a message text.
///
/// `offset` and `length` are measured in UTF-16 code units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Entity type, e.g. "mention", "url", "bot_command".
    #[serde(rename = "type")]
    pub kind: String,

    pub offset: usize,

    pub length: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageEntity {
    /// Create an entity of the given type.
    pub fn new(kind: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind: kind.into(),
            offset,
            length,
            ..Default::default()
        }
    }

    /// Whether this is an `@username` mention.
    pub fn is_mention(&self) -> bool {
        self.kind == "mention"
    }
}

/// Extract the text an entity refers to.
///
/// Returns `None` when the span runs past the end of `text` or cuts a
/// surrogate pair in half.
pub fn entity_text(text: &str, entity: &MessageEntity) -> Option<String> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let end = entity.offset.checked_add(entity.length)?;
    let span = units.get(entity.offset..end)?;
    String::from_utf16(span).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_text_ascii() {
        let entity = MessageEntity::new("mention", 6, 4);
        assert_eq!(entity_text("hello @bot", &entity).as_deref(), Some("@bot"));
    }

    #[test]
    fn test_entity_text_counts_utf16_units() {
        // The emoji takes two UTF-16 code units.
        let text = "\u{1F600} @bot";
        let entity = MessageEntity::new("mention", 3, 4);
        assert_eq!(entity_text(text, &entity).as_deref(), Some("@bot"));
    }

    #[test]
    fn test_entity_text_out_of_bounds() {
        let entity = MessageEntity::new("mention", 6, 10);
        assert_eq!(entity_text("hello @bot", &entity), None);

        let entity = MessageEntity::new("mention", usize::MAX, 2);
        assert_eq!(entity_text("hello", &entity), None);
    }

    #[test]
    fn test_entity_text_split_surrogate() {
        let entity = MessageEntity::new("mention", 0, 1);
        assert_eq!(entity_text("\u{1F600}", &entity), None);
    }

    #[test]
    fn test_display_identity() {
        let user = User {
            id: 1,
            is_bot: true,
            first_name: "Rec".to_string(),
            last_name: Some("Bot".to_string()),
            username: Some("rec_bot".to_string()),
            ..Default::default()
        };
        assert_eq!(user.display_identity(), "rec_bot");

        let user = User {
            username: None,
            ..user
        };
        assert_eq!(user.display_identity(), "Rec Bot");

        let user = User {
            last_name: None,
            ..user
        };
        assert_eq!(user.display_identity(), "Rec");
    }

    #[test]
    fn test_message_keeps_unknown_fields() {
        let raw = r#"{
            "message_id": 7,
            "chat": {"id": 42, "type": "private"},
            "date": 1700000000,
            "text": "hi",
            "sticker": {"file_id": "abc"}
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert!(message.chat.is_private());
        assert!(message.extra.contains_key("sticker"));

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sticker"]["file_id"], "abc");
        assert_eq!(value["chat"]["type"], "private");
    }

    #[test]
    fn test_nested_objects_keep_unknown_fields() {
        let raw = r#"{
            "message_id": 8,
            "from": {"id": 5, "is_bot": false, "first_name": "Ann", "language_code": "zh-hans"},
            "chat": {"id": -100, "type": "supergroup", "title": "g", "is_forum": true},
            "date": 1700000000,
            "text": "hi @bot",
            "entities": [{"type": "mention", "offset": 3, "length": 4, "custom_emoji_id": "x"}]
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.chat.kind, "supergroup");
        assert!(message.entities[0].is_mention());

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["from"]["language_code"], "zh-hans");
        assert_eq!(value["from"]["first_name"], "Ann");
        assert_eq!(value["chat"]["is_forum"], true);
        assert_eq!(value["chat"]["type"], "supergroup");
        assert_eq!(value["entities"][0]["custom_emoji_id"], "x");
        assert!(value["chat"].get("extra").is_none());
    }

    #[test]
    fn test_body_falls_back_to_caption() {
        let message = Message {
            caption: Some("look".to_string()),
            ..Default::default()
        };
        assert_eq!(message.body(), "look");
        assert_eq!(Message::default().body(), "");
    }
}
