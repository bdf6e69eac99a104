//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("catalog database error")]
    Database,
    #[display("catalog migration error")]
    Migration,
    /// The underlying store rejected a write because the database or the
    /// disk holding it is full.
    #[display("storage quota exceeded")]
    QuotaExceeded,
    #[display("drive not found: {_0}")]
    DriveNotFound(#[error(not(source))] i64),
    /// A value could not be represented in (or read back from) a row.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
