//! Types for calling Bot API methods.

use serde::Serialize;

/// Longest text a single `sendMessage` accepts, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

/// Parameters for `sendMessage`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageParams {
    pub chat_id: i64,

    pub text: String,
}

impl SendMessageParams {
    /// Create params for a plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// Parameters for `getUpdates`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetUpdatesParams {
    /// First update to return; confirms every update below it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Long-poll timeout in seconds.
    pub timeout: u64,
}

/// Split `text` into chunks of at most `max_units` UTF-16 code units.
///
/// Splits happen on character boundaries, preferring the last newline in
/// the second half of a chunk.
pub fn split_text(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(2);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut units = 0usize;

    for ch in text.chars() {
        let width = ch.len_utf16();
        if units + width > max_units {
            let (head, tail) = break_at_newline(&current, max_units);
            chunks.push(head);
            current = tail;
            units = current.encode_utf16().count();
        }
        current.push(ch);
        units += width;
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn break_at_newline(chunk: &str, max_units: usize) -> (String, String) {
    if let Some(pos) = chunk.rfind('\n') {
        if chunk[..pos].encode_utf16().count() >= max_units / 2 {
            return (chunk[..=pos].to_string(), chunk[pos + 1..].to_string());
        }
    }
    (chunk.to_string(), String::new())
}
