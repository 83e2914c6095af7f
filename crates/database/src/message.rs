//! Message persistence.

use serde::Serialize;
use sqlx::AnyPool;

use crate::models::{MessageRecord, StoredContent};
use crate::schema::MESSAGES_TABLE;
use crate::{DatabaseError, Result};

/// Insert a message and return the id of the new row.
///
/// `message` is serialized inside a [`StoredContent`] envelope.
pub async fn insert_message<T: Serialize>(
    pool: &AnyPool,
    chat_id: i64,
    message: &T,
) -> Result<i64> {
    let content = serde_json::to_string(&StoredContent::new(message))?;

    let result = sqlx::query(
        r#"
        INSERT INTO recbot (content, chat_id)
        VALUES (?, ?)
        "#,
    )
    .bind(content)
    .bind(chat_id)
    .execute(pool)
    .await?;

    result
        .last_insert_id()
        .ok_or(DatabaseError::MissingInsertId(MESSAGES_TABLE))
}

/// Attach the reply to a previously inserted message.
pub async fn attach_reply(pool: &AnyPool, id: i64, reply: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE recbot
        SET reply = ?
        WHERE id = ?
        "#,
    )
    .bind(reply)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "message",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Get a message by id.
pub async fn get_message(pool: &AnyPool, id: i64) -> Result<MessageRecord> {
    // CAST keeps JSON/TEXT/DATETIME columns decodable as strings on every backend.
    sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id,
               chat_id,
               CAST(content AS CHAR) AS content,
               CAST(reply AS CHAR) AS reply,
               CAST(create_at AS CHAR) AS create_at
        FROM recbot
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "message",
        id: id.to_string(),
    })
}

/// List messages that have not received a reply yet, oldest first.
pub async fn list_unanswered(pool: &AnyPool, limit: i64) -> Result<Vec<MessageRecord>> {
    let rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id,
               chat_id,
               CAST(content AS CHAR) AS content,
               CAST(reply AS CHAR) AS reply,
               CAST(create_at AS CHAR) AS create_at
        FROM recbot
        WHERE reply IS NULL
        ORDER BY id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List messages with an id greater than `after_id`, oldest first.
///
/// Pass the last id seen to page through new rows without skipping any.
pub async fn list_since(pool: &AnyPool, after_id: i64, limit: i64) -> Result<Vec<MessageRecord>> {
    let rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id,
               chat_id,
               CAST(content AS CHAR) AS content,
               CAST(reply AS CHAR) AS reply,
               CAST(create_at AS CHAR) AS create_at
        FROM recbot
        WHERE id > ?
        ORDER BY id ASC
        LIMIT ?
        "#,
    )
    .bind(after_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List the `limit` most recent messages, oldest first.
pub async fn list_latest(pool: &AnyPool, limit: i64) -> Result<Vec<MessageRecord>> {
    let mut rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id,
               chat_id,
               CAST(content AS CHAR) AS content,
               CAST(reply AS CHAR) AS reply,
               CAST(create_at AS CHAR) AS create_at
        FROM recbot
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}
