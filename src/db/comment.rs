//! Saved comment repository
//!
//! Comments are written once, when a signed-in user saves an analysis, and
//! only ever read back afterwards.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::DbPool;
use super::user::parse_datetime;
use crate::{Error, Result};

/// Maximum rows returned by a history query
pub const HISTORY_LIMIT: usize = 100;

const DEFAULT_USERNAME: &str = "Anonymous";
const DEFAULT_URL: &str = "Unknown URL";

/// A comment as submitted for saving
///
/// Fields are loosely typed because clients send back whatever shape they
/// rendered; toxicity may arrive as `toxicity` or `toxicityScore`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub toxicity: Option<Value>,
    #[serde(default)]
    pub toxicity_score: Option<Value>,
}

impl NewComment {
    /// Numeric `toxicity`, else numeric `toxicityScore`, else 0
    #[must_use]
    pub fn resolved_toxicity(&self) -> f64 {
        [&self.toxicity, &self.toxicity_score]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(Value::as_f64))
            .unwrap_or(0.0)
    }
}

/// A persisted comment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredComment {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub toxicity_score: f64,
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Saved comment repository
#[derive(Clone)]
pub struct CommentRepo {
    pool: DbPool,
}

impl CommentRepo {
    /// Create a new comment repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Save a batch of comments for a user in one transaction
    ///
    /// Every row in the batch shares one server-assigned timestamp.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty batch, or a database error
    pub fn save_batch(&self, user_id: &str, url: Option<&str>, comments: &[NewComment]) -> Result<usize> {
        if comments.is_empty() {
            return Err(Error::Validation("No comments provided".to_string()));
        }

        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let url = url.filter(|u| !u.trim().is_empty()).unwrap_or(DEFAULT_URL);
        let analyzed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO comments (id, user_id, username, text, toxicity_score, url, analyzed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for c in comments {
                let username = c
                    .username
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .unwrap_or(DEFAULT_USERNAME);
                stmt.execute(rusqlite::params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    username,
                    c.text.as_deref().unwrap_or_default(),
                    c.resolved_toxicity(),
                    url,
                    analyzed_at,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(user_id, count = comments.len(), "saved comments");
        Ok(comments.len())
    }

    /// Saved comments for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<StoredComment>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, username, text, toxicity_score, url, analyzed_at
             FROM comments WHERE user_id = ?1
             ORDER BY analyzed_at DESC, rowid DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let comments = stmt
            .query_map(rusqlite::params![user_id, limit], |row| {
                Ok(StoredComment {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    username: row.get(2)?,
                    text: row.get(3)?,
                    toxicity_score: row.get(4)?,
                    url: row.get(5)?,
                    analyzed_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(comments)
    }
}
