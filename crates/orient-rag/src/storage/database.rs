//! SQLite database for durable feedback storage

use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::learning::{FeedbackEvent, FeedbackStats, Sentiment};

/// SQLite-based feedback database
///
/// One row per interaction; writing an id again replaces the earlier row.
pub struct FeedbackDb {
    conn: Arc<Mutex<Connection>>,
}

impl FeedbackDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run a raw statement (for testing rows written by other tools)
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) {
        self.conn.lock().execute(sql, []).unwrap();
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                query TEXT,
                response TEXT,
                feedback TEXT,
                timestamp TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_feedback_feedback ON feedback(feedback);
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Insert or overwrite the feedback for an interaction
    pub fn record_feedback(&self, event: &FeedbackEvent) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO feedback (id, query, response, feedback, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.query,
                event.response,
                event.feedback.as_str(),
                event.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Feedback stored for one interaction
    pub fn get_feedback(&self, id: &Uuid) -> Result<Option<FeedbackEvent>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, query, response, feedback, timestamp FROM feedback WHERE id = ?1",
                params![id.to_string()],
                read_row,
            )
            .optional()?;

        Ok(row.and_then(row_to_event))
    }

    /// Like/dislike counts grouped by the stored value
    pub fn feedback_stats(&self) -> Result<FeedbackStats> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT feedback, COUNT(*) FROM feedback GROUP BY feedback")?;
        let counts: HashMap<String, i64> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    row.get::<_, i64>(1)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let likes = counts.get(Sentiment::Like.as_str()).copied().unwrap_or(0) as usize;
        let dislikes = counts.get(Sentiment::Dislike.as_str()).copied().unwrap_or(0) as usize;

        Ok(FeedbackStats {
            likes,
            dislikes,
            total: likes + dislikes,
        })
    }

    /// Number of stored rows, including ones `all_feedback` skips
    pub fn row_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Every stored event in table order
    pub fn all_feedback(&self) -> Result<Vec<FeedbackEvent>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, query, response, feedback, timestamp FROM feedback ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().filter_map(row_to_event).collect())
    }
}

type RawRow = (Option<String>, Option<String>, Option<String>, Option<String>, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

/// Rows written by other tools may carry ids or values this crate does not issue
fn row_to_event(row: RawRow) -> Option<FeedbackEvent> {
    let (id_str, query, response, feedback, timestamp) = row;

    let Some(id_str) = id_str else {
        tracing::warn!("Skipping feedback row without an id");
        return None;
    };

    let id = match Uuid::parse_str(&id_str) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Skipping feedback row with non-UUID id {:?}", id_str);
            return None;
        }
    };

    let feedback = match feedback.as_deref().unwrap_or_default().parse::<Sentiment>() {
        Ok(sentiment) => sentiment,
        Err(e) => {
            tracing::warn!("Skipping feedback row {}: {}", id, e);
            return None;
        }
    };

    let timestamp = match timestamp.as_deref().and_then(parse_timestamp) {
        Some(timestamp) => timestamp,
        None => {
            tracing::warn!("Feedback row {} has no readable timestamp, using now", id);
            Utc::now()
        }
    };

    Some(FeedbackEvent {
        id,
        query: query.unwrap_or_default(),
        response: response.unwrap_or_default(),
        feedback,
        timestamp,
    })
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
