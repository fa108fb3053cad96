//! User repository for account storage

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::DbPool;
use crate::{Error, Result};

/// A registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: DbPool,
}

impl UserRepo {
    /// Create a new user repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an account
    ///
    /// Emails are matched case-insensitively and stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email is already registered, or a database error
    pub fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let email = normalize_email(email);
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let inserted = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(email) DO NOTHING",
            rusqlite::params![id, name, email, password_hash, now.to_rfc3339()],
        )?;

        if inserted == 0 {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        tracing::info!(user_id = %id, "user created");

        Ok(User {
            id,
            name: name.to_string(),
            email,
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    /// Find a user by email (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
                [normalize_email(email)],
                row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Find a user by ID (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: &str) -> Result<Option<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()?;

        Ok(user)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
