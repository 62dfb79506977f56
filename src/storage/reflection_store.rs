//! Reflection persistence.
//!
//! Reflections are immutable once created and cascade-delete with their
//! task.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;
use crate::storage::database::DatabaseError;
use crate::storage::parse_datetime;

/// A stored reflection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: i64,
    pub task_id: i64,
    pub emoji_rating: i64,
    pub reflection_text: String,
    pub sentiment: Sentiment,
    pub created_at: DateTime<Utc>,
}

/// A reflection joined with its task title, for the log view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionLog {
    pub id: i64,
    pub task_id: i64,
    pub emoji_rating: i64,
    pub reflection_text: String,
    pub sentiment: Sentiment,
    pub created_at: DateTime<Utc>,
    pub task_title: String,
}

/// Reflection store.
pub struct ReflectionStore<'a> {
    conn: &'a Connection,
}

impl<'a> ReflectionStore<'a> {
    /// Create a new reflection store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a reflection and return the stored row.
    pub fn insert_reflection(
        &self,
        task_id: i64,
        emoji_rating: i64,
        reflection_text: &str,
        sentiment: Sentiment,
    ) -> Result<Reflection, DatabaseError> {
        let created_at = Utc::now();

        self.conn
            .execute(
                "INSERT INTO reflections (task_id, emoji_rating, reflection_text, sentiment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task_id,
                    emoji_rating,
                    reflection_text,
                    sentiment.as_str(),
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(Reflection {
            id: self.conn.last_insert_rowid(),
            task_id,
            emoji_rating,
            reflection_text: reflection_text.to_string(),
            sentiment,
            created_at,
        })
    }

    /// List a user's reflections joined with task titles, newest first.
    pub fn list_logs(&self, user_id: i64) -> Result<Vec<ReflectionLog>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.id, r.task_id, r.emoji_rating, r.reflection_text, r.sentiment,
                        r.created_at, t.title
                 FROM reflections r
                 INNER JOIN tasks t ON t.id = r.task_id
                 WHERE t.user_id = ?1
                 ORDER BY r.created_at DESC, r.id DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(ReflectionLogRow {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    emoji_rating: row.get(2)?,
                    reflection_text: row.get(3)?,
                    sentiment: row.get(4)?,
                    created_at: row.get(5)?,
                    task_title: row.get(6)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut logs = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            logs.push(row.into_log()?);
        }

        Ok(logs)
    }

    /// Count reflections recorded for a task.
    pub fn count_for_task(&self, task_id: i64) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM reflections WHERE task_id = ?1",
                params![task_id],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

/// Intermediate struct for reading reflection log rows from database.
struct ReflectionLogRow {
    id: i64,
    task_id: i64,
    emoji_rating: i64,
    reflection_text: String,
    sentiment: String,
    created_at: String,
    task_title: String,
}

impl ReflectionLogRow {
    fn into_log(self) -> Result<ReflectionLog, DatabaseError> {
        let sentiment = self
            .sentiment
            .parse::<Sentiment>()
            .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?;

        Ok(ReflectionLog {
            id: self.id,
            task_id: self.task_id,
            emoji_rating: self.emoji_rating,
            reflection_text: self.reflection_text,
            sentiment,
            created_at: parse_datetime(&self.created_at)?,
            task_title: self.task_title,
        })
    }
}
