//! Common error types for the curriculum workspace

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for curriculum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by every crate that touches the curriculum store
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML config file exists but could not be parsed
    #[error("Invalid config file {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// True for SQLite lock contention ("database is locked"), which is
    /// worth retrying after a backoff.
    pub fn is_lock_contention(&self) -> bool {
        match self {
            Error::Database(err) => is_lock_error(err),
            _ => false,
        }
    }
}

/// Check whether a sqlx error is SQLite busy/locked contention
pub fn is_lock_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Check whether a sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
