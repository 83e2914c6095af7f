//! Table management for the message store.

use sqlx::AnyPool;

use crate::{Backend, Result};

/// Name of the message table. Earlier deployments already use it, so their
/// history stays readable.
pub const MESSAGES_TABLE: &str = "recbot";

const MYSQL_CREATE_MESSAGES: &str = r#"
    CREATE TABLE IF NOT EXISTS recbot (
        id BIGINT NOT NULL AUTO_INCREMENT,
        chat_id BIGINT NOT NULL,
        content JSON NOT NULL,
        reply TEXT DEFAULT NULL,
        create_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        KEY idx_recbot_create_at (create_at),
        PRIMARY KEY (id)
    )
"#;

const SQLITE_CREATE_MESSAGES: &str = r#"
    CREATE TABLE IF NOT EXISTS recbot (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        content TEXT NOT NULL,
        reply TEXT DEFAULT NULL,
        create_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const SQLITE_CREATE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_recbot_create_at ON recbot (create_at)
"#;

/// Create the message table if it does not exist.
pub async fn create_tables(pool: &AnyPool, backend: Backend) -> Result<()> {
    match backend {
        Backend::MySql => {
            sqlx::query(MYSQL_CREATE_MESSAGES).execute(pool).await?;
        }
        Backend::Sqlite => {
            sqlx::query(SQLITE_CREATE_MESSAGES).execute(pool).await?;
            sqlx::query(SQLITE_CREATE_INDEX).execute(pool).await?;
        }
    }
    Ok(())
}

/// Drop the message table and everything in it.
pub async fn drop_tables(pool: &AnyPool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS recbot")
        .execute(pool)
        .await?;
    Ok(())
}
