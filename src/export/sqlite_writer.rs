use super::writer_backend::{ExportBackend, ExportError};
use crate::harvest::types::ExportRow;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

/// Batches rows into a `comments` table
pub struct SqliteWriter {
    conn: Connection,
    batch: Vec<ExportRow>,
    batch_size: usize,
}

impl SqliteWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, ExportError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        // No uniqueness on comment_id: accounts may be visited twice
        conn.execute(
            "CREATE TABLE IF NOT EXISTS comments (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id INTEGER NOT NULL,
                bucket TEXT NOT NULL,
                likes INTEGER NOT NULL,
                dislikes INTEGER NOT NULL,
                user_vote INTEGER NOT NULL,
                status TEXT NOT NULL,
                banned INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                locator TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bucket ON comments(bucket)",
            [],
        )?;

        log::info!("✅ SQLite export database initialized");

        Ok(Self {
            conn,
            batch: Vec::with_capacity(500),
            batch_size: 500,
        })
    }

    fn flush_batch(&mut self) -> Result<(), ExportError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;

        for row in &self.batch {
            let id = to_integer("comment_id", row.id)?;
            let likes = to_integer("likes", row.likes)?;
            let dislikes = to_integer("dislikes", row.dislikes)?;
            tx.execute(
                "INSERT INTO comments
                 (comment_id, bucket, likes, dislikes, user_vote, status, banned, created_at, locator)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    row.bucket.as_str(),
                    likes,
                    dislikes,
                    row.user_vote,
                    row.status,
                    row.banned,
                    row.created_at.to_rfc3339(),
                    row.locator,
                ],
            )?;
        }

        tx.commit()?;

        log::debug!("✅ Flushed {} rows to SQLite", self.batch.len());
        self.batch.clear();

        Ok(())
    }
}

/// SQLite integers are signed 64-bit
fn to_integer(field: &'static str, value: u64) -> Result<i64, ExportError> {
    i64::try_from(value).map_err(|_| ExportError::OutOfRange { field, value })
}

#[async_trait]
impl ExportBackend for SqliteWriter {
    async fn write(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        self.batch.push(row.clone());

        if self.batch.len() >= self.batch_size {
            self.flush_batch()?;
        }

        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ExportError> {
        self.flush_batch()
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::types::Bucket;
    use chrono::Utc;
    use tempfile::tempdir;

    fn row(id: u64, bucket: Bucket) -> ExportRow {
        ExportRow {
            id,
            bucket,
            likes: 5,
            dislikes: 1,
            user_vote: 0,
            status: "visible".to_string(),
            banned: false,
            created_at: Utc::now(),
            locator: format!("https://t-j.ru/a/#c{}", id),
        }
    }

    #[tokio::test]
    async fn test_sqlite_write_and_flush() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("export.db");

        let mut writer = SqliteWriter::new(&db_path).unwrap();
        writer.write(&row(1, Bucket::Both)).await.unwrap();
        writer.write(&row(1, Bucket::Both)).await.unwrap();
        writer.write(&row(2, Bucket::OnlyLikes)).await.unwrap();
        writer.flush().await.unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let both: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM comments WHERE bucket = ?1",
                params!["both"],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(both, 2);
    }

    #[tokio::test]
    async fn test_sqlite_rejects_unrepresentable_id() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("range.db");

        let mut writer = SqliteWriter::new(&db_path).unwrap();
        writer.write(&row(1, Bucket::Both)).await.unwrap();
        writer.write(&row(u64::MAX, Bucket::Both)).await.unwrap();

        match writer.flush().await {
            Err(ExportError::OutOfRange { field, value }) => {
                assert_eq!(field, "comment_id");
                assert_eq!(value, u64::MAX);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }

        // The failed batch is rolled back as a whole
        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_sqlite_empty_export_creates_table() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("empty.db");

        let mut writer = SqliteWriter::new(&db_path).unwrap();
        writer.flush().await.unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
