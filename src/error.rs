//! Error types for Toxiscope

use thiserror::Error;

use crate::platform::Platform;

/// Result type alias for Toxiscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Toxiscope
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Analyze request carried no URL
    #[error("URL required")]
    MissingUrl,

    /// URL does not belong to any supported platform
    #[error("unsupported URL type: {0}")]
    UnsupportedPlatform(String),

    /// URL belongs to a platform but the post identifier could not be extracted
    #[error("invalid {0} URL")]
    InvalidPostUrl(Platform),

    /// Upstream comment API failure (transport or HTTP status)
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Scoring process failure or unparseable output
    #[error("scoring error: {0}")]
    Scoring(String),

    /// Scorer returned a different number of scores than comments sent
    #[error("scorer returned {got} scores for {expected} comments")]
    ScoreMismatch { expected: usize, got: usize },

    /// Request body failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource already exists
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials rejected at login
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Authentication/authorization error
    #[error("auth error: {0}")]
    Auth(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
