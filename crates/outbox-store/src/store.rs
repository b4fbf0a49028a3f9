//! Queue store connection and operations.

use crate::{migrations, PendingMessage, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

/// Durable queue of outbound messages, backed by SQLite.
///
/// One instance exists per application instance; the on-disk state
/// outlives the process, so no explicit teardown is required.
pub struct QueueStore {
    conn: Connection,
}

impl QueueStore {
    /// Open the store at the given path, running migrations if needed.
    ///
    /// Idempotent: the keyspace and its chat index are created only if
    /// absent. Fails with [`StoreError::Unavailable`] if the platform
    /// denies storage access.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        migrations::run_migrations(&conn)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Open an in-memory store for testing.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        migrations::run_migrations(&conn)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Durably append a message, returning its assigned local id once the
    /// write is committed.
    ///
    /// Fails with [`StoreError::WriteFailed`] if the commit did not land;
    /// the caller must then treat the message as not queued.
    pub fn enqueue(&self, chat_id: &str, payload: &serde_json::Value) -> StoreResult<i64> {
        let content = serde_json::to_string(payload)?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO unsynced_messages (chat_id, payload, queued_at)
                 VALUES (?1, ?2, ?3)",
                params![chat_id, content, now],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let local_id = self.conn.last_insert_rowid();
        debug!(chat_id = %chat_id, local_id, "Message queued");
        Ok(local_id)
    }

    /// List all pending messages for a conversation in insertion order.
    ///
    /// `local_id` increases monotonically and is the sort key, so the
    /// returned order matches enqueue order.
    pub fn list_by_chat(&self, chat_id: &str) -> StoreResult<Vec<PendingMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, chat_id, payload, queued_at
             FROM unsynced_messages WHERE chat_id = ?1 ORDER BY local_id ASC",
        )?;

        let messages = stmt
            .query_map(params![chat_id], |row| {
                let raw: String = row.get(2)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    raw,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|(local_id, chat_id, raw, queued_at)| {
                Ok(PendingMessage {
                    local_id,
                    chat_id,
                    payload: serde_json::from_str(&raw)?,
                    queued_at: parse_datetime(&queued_at),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(messages)
    }

    /// Remove a message after successful server acknowledgment.
    ///
    /// Removing an unknown id is a no-op, not an error, so retried
    /// acknowledgments are safe. Returns whether a row was deleted.
    pub fn remove(&self, local_id: i64) -> StoreResult<bool> {
        let count = self
            .conn
            .execute(
                "DELETE FROM unsynced_messages WHERE local_id = ?1",
                params![local_id],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        if count > 0 {
            debug!(local_id, "Message removed");
        }
        Ok(count > 0)
    }

    /// Total number of pending messages across all conversations.
    pub fn pending_count(&self) -> StoreResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM unsynced_messages", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    /// Distinct conversations that still have a backlog, for drain
    /// scheduling.
    pub fn chat_ids(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT chat_id FROM unsynced_messages ORDER BY chat_id ASC",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

/// Parse an RFC3339 datetime string, falling back to current time on error.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
