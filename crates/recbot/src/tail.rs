//! `recbot tail`: follow the message table and print each row's content.

use std::future::Future;
use std::io::Write;

use database::{message, Database, DatabaseError, MessageRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::TailSettings;

/// Errors that stop the tail loop.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Cursor over the message table.
pub struct Tailer {
    db: Database,
    last_id: i64,
    batch_size: i64,
    unwrap: bool,
}

impl Tailer {
    pub fn new(db: Database, batch_size: i64, unwrap: bool) -> Self {
        Self {
            db,
            last_id: 0,
            batch_size,
            unwrap,
        }
    }

    /// Highest id printed or skipped so far.
    pub fn last_id(&self) -> i64 {
        self.last_id
    }

    /// Print the latest batch of rows, or only remember where it ends when
    /// `skip` is set.
    pub async fn start<W: Write>(&mut self, out: &mut W, skip: bool) -> Result<usize, TailError> {
        let rows = message::list_latest(self.db.pool(), self.batch_size).await?;
        if skip {
            self.last_id = rows.iter().map(|r| r.id).max().unwrap_or(self.last_id);
            debug!("Skipping {} existing rows (up to id {})", rows.len(), self.last_id);
            return Ok(0);
        }
        self.emit(out, &rows)
    }

    /// Print every row newer than the last one seen.
    pub async fn poll<W: Write>(&mut self, out: &mut W) -> Result<usize, TailError> {
        let mut printed = 0;
        loop {
            let rows = message::list_since(self.db.pool(), self.last_id, self.batch_size).await?;
            printed += self.emit(out, &rows)?;
            if (rows.len() as i64) < self.batch_size {
                return Ok(printed);
            }
        }
    }

    fn emit<W: Write>(&mut self, out: &mut W, rows: &[MessageRecord]) -> Result<usize, TailError> {
        for row in rows {
            writeln!(out, "{}", self.render(row))?;
            self.last_id = self.last_id.max(row.id);
        }
        out.flush()?;
        Ok(rows.len())
    }

    fn render(&self, row: &MessageRecord) -> String {
        if !self.unwrap {
            return row.content.clone();
        }
        match row.content_json() {
            Ok(content) => content.message.to_string(),
            Err(e) => {
                warn!("Row {} holds invalid JSON, printing it as stored: {}", row.id, e);
                row.content.clone()
            }
        }
    }
}

/// Follow the table until `shutdown` completes.
///
/// Failed polls are logged and retried on the next tick.
pub async fn run<W, S>(
    settings: &TailSettings,
    db: Database,
    out: &mut W,
    shutdown: S,
) -> Result<(), TailError>
where
    W: Write,
    S: Future<Output = ()>,
{
    let mut tailer = Tailer::new(db, settings.batch_size, settings.unwrap);
    tailer.start(out, settings.skip_exists).await?;
    info!("Following new rows after id {}", tailer.last_id());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => return Ok(()),

            _ = tokio::time::sleep(settings.interval) => match tailer.poll(out).await {
                Ok(_) => {}
                Err(TailError::Database(e)) => warn!("Poll failed: {}", e),
                Err(e) => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.ensure_schema().await.unwrap();
        db
    }

    async fn insert(db: &Database, text: &str) -> i64 {
        message::insert_message(db.pool(), 1, &text).await.unwrap()
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_start_prints_latest_batch_then_new_rows() {
        let db = test_db().await;
        insert(&db, "one").await;
        insert(&db, "two").await;
        insert(&db, "three").await;

        let mut tailer = Tailer::new(db.clone(), 2, true);
        let mut out = Vec::new();
        assert_eq!(tailer.start(&mut out, false).await.unwrap(), 2);
        assert_eq!(lines(&out), vec!["\"two\"", "\"three\""]);

        out.clear();
        assert_eq!(tailer.poll(&mut out).await.unwrap(), 0);
        assert!(out.is_empty());

        let id = insert(&db, "four").await;
        assert_eq!(tailer.poll(&mut out).await.unwrap(), 1);
        assert_eq!(lines(&out), vec!["\"four\""]);
        assert_eq!(tailer.last_id(), id);
    }

    #[tokio::test]
    async fn test_skip_exists_prints_only_new_rows() {
        let db = test_db().await;
        insert(&db, "old").await;

        let mut tailer = Tailer::new(db.clone(), 100, true);
        let mut out = Vec::new();
        assert_eq!(tailer.start(&mut out, true).await.unwrap(), 0);
        assert!(out.is_empty());

        insert(&db, "new").await;
        tailer.poll(&mut out).await.unwrap();
        assert_eq!(lines(&out), vec!["\"new\""]);
    }

    #[tokio::test]
    async fn test_poll_drains_more_than_one_batch() {
        let db = test_db().await;
        let mut tailer = Tailer::new(db.clone(), 2, true);
        let mut out = Vec::new();
        tailer.start(&mut out, false).await.unwrap();

        for text in ["a", "b", "c", "d", "e"] {
            insert(&db, text).await;
        }
        assert_eq!(tailer.poll(&mut out).await.unwrap(), 5);
        assert_eq!(lines(&out), vec!["\"a\"", "\"b\"", "\"c\"", "\"d\"", "\"e\""]);
    }

    #[tokio::test]
    async fn test_prints_stored_envelope_by_default() {
        let db = test_db().await;
        insert(&db, "hi").await;

        let mut tailer = Tailer::new(db, 100, false);
        let mut out = Vec::new();
        tailer.start(&mut out, false).await.unwrap();

        let printed = lines(&out);
        assert_eq!(printed.len(), 1);
        assert!(printed[0].contains("\"schema_version\":1"));
        assert!(printed[0].contains("\"message\":\"hi\""));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let db = test_db().await;
        insert(&db, "hi").await;

        let settings = TailSettings {
            dsn: "sqlite::memory:".to_string(),
            interval: Duration::from_millis(10),
            skip_exists: false,
            batch_size: 100,
            unwrap: true,
        };
        let mut out = Vec::new();
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        run(&settings, db, &mut out, shutdown).await.unwrap();

        assert_eq!(lines(&out), vec!["\"hi\""]);
    }
}
