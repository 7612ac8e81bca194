//! Error types for curriculum-import
//!
//! Each variant maps to a stable error code used in batch reports and CLI
//! output.

use thiserror::Error;

/// Import pipeline error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Workbook unreadable or sheet structure unexpected (not retried)
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Required program field missing or placeholder; file rejected
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    /// Requested program does not exist
    #[error("Program not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// curriculum-common error
    #[error("Common error: {0}")]
    Common(#[from] curriculum_common::Error),

    /// Internal error (worker thread failure, retry budget exhausted)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImportError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportError::Parse { .. } => "PARSE_ERROR",
            ImportError::InvalidProgram(_) => "INVALID_PROGRAM",
            ImportError::NotFound(_) => "NOT_FOUND",
            ImportError::Database(_) => "DATABASE_ERROR",
            ImportError::Common(_) => "COMMON_ERROR",
            ImportError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for SQLite busy/locked contention
    pub fn is_lock_contention(&self) -> bool {
        match self {
            ImportError::Database(err) => curriculum_common::error::is_lock_error(err),
            ImportError::Common(err) => err.is_lock_contention(),
            _ => false,
        }
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
