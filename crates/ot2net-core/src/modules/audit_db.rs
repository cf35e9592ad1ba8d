//! SQLite-backed audit log of AI calls.
#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::as_conversions,
    reason = "token counts and millisecond timestamps fit in i64"
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ot2net_types::{AuditError, UpstreamCallRecord, UsageSummary};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DB_FILE: &str = "ai_calls.db";

/// Sink for AI call outcomes.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, record: &UpstreamCallRecord) -> Result<(), AuditError>;
}

/// Default database location: `<data_dir>/ai_calls.db`.
pub fn default_db_path() -> Result<PathBuf, String> {
    let data_dir = crate::utils::paths::get_data_dir()?;
    Ok(data_dir.join(DB_FILE))
}

/// Audit log persisted to the `ai_calls` table.
///
/// A single connection is shared behind a mutex; every statement runs on
/// the blocking thread pool.
#[derive(Clone)]
pub struct SqliteAuditLog {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAuditLog").finish_non_exhaustive()
    }
}

impl SqliteAuditLog {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AuditError::Unavailable {
                    message: format!("Failed to create {}: {}", parent.display(), e),
                })?;
            }
        }
        let conn = Connection::open(path).map_err(unavailable)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AuditError> {
        init_schema(&conn).map_err(unavailable)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Aggregate all calls recorded at or after `since` (everything when `None`).
    pub async fn usage_summary(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<UsageSummary, AuditError> {
        let since_ms = since.map_or(i64::MIN, |ts| ts.timestamp_millis());
        let summary = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*),
                            COALESCE(SUM(succeeded), 0),
                            COALESCE(SUM(input_tokens), 0),
                            COALESCE(SUM(output_tokens), 0),
                            COALESCE(SUM(cost), 0.0)
                     FROM ai_calls WHERE timestamp >= ?1",
                    params![since_ms],
                    |row| {
                        let total: i64 = row.get(0)?;
                        let succeeded: i64 = row.get(1)?;
                        Ok(UsageSummary {
                            total_calls: total as u64,
                            succeeded: succeeded as u64,
                            failed: (total - succeeded) as u64,
                            input_tokens: row.get::<_, i64>(2)? as u64,
                            output_tokens: row.get::<_, i64>(3)? as u64,
                            total_cost: row.get(4)?,
                            since: None,
                        })
                    },
                )
            })
            .await
            .map_err(query_failed)?;
        Ok(UsageSummary { since, ..summary })
    }

    /// Most recent records, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<UpstreamCallRecord>, AuditError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, feature, input_tokens, output_tokens, cost, succeeded, error_message, timestamp
                 FROM ai_calls ORDER BY timestamp DESC LIMIT ?1",
            )?;
            let records = stmt
                .query_map(params![limit], row_to_record)?
                .collect::<Result<Vec<_>, _>>();
            records
        })
        .await
        .map_err(query_failed)
    }

    /// Look up a single record by id.
    pub async fn get(&self, id: &str) -> Result<Option<UpstreamCallRecord>, AuditError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, feature, input_tokens, output_tokens, cost, succeeded, error_message, timestamp
                 FROM ai_calls WHERE id = ?1",
                params![id],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(query_failed)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, BlockingError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| BlockingError::Join(e.to_string()))?
        .map_err(BlockingError::Sqlite)
    }
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn record(&self, record: &UpstreamCallRecord) -> Result<(), AuditError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO ai_calls
                    (id, feature, input_tokens, output_tokens, cost, succeeded, error_message, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.feature,
                    record.input_tokens as i64,
                    record.output_tokens as i64,
                    record.cost,
                    record.succeeded,
                    record.error_message,
                    record.timestamp.timestamp_millis(),
                ],
            )
            .map(|_rows| ())
        })
        .await
        .map_err(|e| AuditError::WriteFailed { message: e.to_string() })
    }
}

#[derive(Debug)]
enum BlockingError {
    Sqlite(rusqlite::Error),
    Join(String),
}

impl std::fmt::Display for BlockingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "{}", e),
            Self::Join(e) => write!(f, "blocking task failed: {}", e),
        }
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS ai_calls (
            id TEXT PRIMARY KEY,
            feature TEXT NOT NULL,
            input_tokens INTEGER NOT NULL DEFAULT 0,
            output_tokens INTEGER NOT NULL DEFAULT 0,
            cost REAL NOT NULL DEFAULT 0,
            succeeded INTEGER NOT NULL,
            error_message TEXT,
            timestamp INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ai_calls_timestamp ON ai_calls (timestamp DESC);",
    )
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<UpstreamCallRecord> {
    let ts_ms: i64 = row.get(7)?;
    Ok(UpstreamCallRecord {
        id: row.get(0)?,
        feature: row.get(1)?,
        input_tokens: row.get::<_, i64>(2)? as u64,
        output_tokens: row.get::<_, i64>(3)? as u64,
        cost: row.get(4)?,
        succeeded: row.get(5)?,
        error_message: row.get(6)?,
        timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
    })
}

fn unavailable(e: rusqlite::Error) -> AuditError {
    AuditError::Unavailable { message: e.to_string() }
}

fn query_failed(e: BlockingError) -> AuditError {
    AuditError::QueryFailed { message: e.to_string() }
}
