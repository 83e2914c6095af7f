//! Database models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::Result;

/// Version of the envelope wrapped around stored message content.
pub const CONTENT_SCHEMA_VERSION: u32 = 1;

/// Version reported for rows written before the envelope existed, which
/// hold the bare message snapshot.
pub const LEGACY_SCHEMA_VERSION: u32 = 0;

/// One inbound message and, once computed, the reply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    /// Auto-incrementing ID, assigned at insert.
    pub id: i64,
    /// Chat the message was received in.
    pub chat_id: i64,
    /// Serialized [`StoredContent`].
    pub content: String,
    /// Reply text; `None` while processing or when processing failed.
    pub reply: Option<String>,
    /// Insertion timestamp, assigned by the database.
    pub create_at: String,
}

impl MessageRecord {
    /// Decode the stored content envelope.
    ///
    /// Content without an envelope is returned as a [`LEGACY_SCHEMA_VERSION`]
    /// snapshot.
    pub fn content_json(&self) -> Result<StoredContent<Value>> {
        let value: Value = serde_json::from_str(&self.content)?;
        let is_envelope = value.get("schema_version").is_some() && value.get("message").is_some();
        if is_envelope {
            return Ok(serde_json::from_value(value)?);
        }
        Ok(StoredContent {
            schema_version: LEGACY_SCHEMA_VERSION,
            message: value,
        })
    }
}

/// Versioned envelope around the raw message snapshot.
///
/// The snapshot itself is whatever the chat client serialized; only the
/// envelope is owned by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContent<T> {
    pub schema_version: u32,
    pub message: T,
}

impl<T> StoredContent<T> {
    /// Wrap a message in the current envelope version.
    pub fn new(message: T) -> Self {
        Self {
            schema_version: CONTENT_SCHEMA_VERSION,
            message,
        }
    }
}
