//! Error type shared by all database operations.
//!
//! Failures fall into a small taxonomy:
//!
//! * [`Error::NotFound`]: no row or interval matched the query. Always recoverable.
//! * [`Error::Storage`]: SQLite failed (I/O, constraint violation, read-only connection).
//! * [`Error::Validation`]: the input is malformed. This indicates a bug in the caller.
//! * [`Error::Cancelled`]: the caller cancelled the operation or its deadline passed.
//!
//! Chain file parsing adds [`Error::Parse`] and [`Error::Io`].
//! Nothing is retried internally.

use std::fmt::Display;

use thiserror::Error;

//-----------------------------------------------------------------------------

/// Result type for genobase operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from genobase operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No row or interval matched the query.
    #[error("No {what} found for {key}")]
    NotFound {
        /// Kind of record that was searched for.
        what: &'static str,
        /// The key that was searched for.
        key: String,
    },

    /// The database operation failed.
    #[error("{operation} failed for {key}: {source}")]
    Storage {
        /// Name of the operation.
        operation: &'static str,
        /// The key the operation was working on.
        key: String,
        /// Error reported by SQLite.
        source: rusqlite::Error,
    },

    /// Malformed input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The operation was cancelled before it completed.
    #[error("{operation} was cancelled")]
    Cancelled {
        /// Name of the operation.
        operation: &'static str,
    },

    /// A line in a chain file could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// Line number (1-based).
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(what: &'static str, key: impl Display) -> Self {
        Error::NotFound { what, key: key.to_string() }
    }

    /// Wraps an SQLite error.
    ///
    /// An interrupted statement means that the progress handler saw a cancelled token, so it becomes [`Error::Cancelled`].
    pub(crate) fn storage(operation: &'static str, key: impl Display, source: rusqlite::Error) -> Self {
        match source {
            rusqlite::Error::SqliteFailure(ref err, _) if err.code == rusqlite::ErrorCode::OperationInterrupted => {
                Error::Cancelled { operation }
            },
            source => Error::Storage { operation, key: key.to_string(), source },
        }
    }

    /// Returns `true` if this is [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` if this is [`Error::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
