//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Validation failures get their own kinds so callers can tell "you gave me
//! nothing to catalog" apart from "the store fell over" — a successful
//! zero-file import is neither.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Rejected before any store mutation.
    #[display("drive name must not be empty")]
    EmptyDriveName,
    /// The selected folder produced no entries and the configured policy
    /// rejects empty runs. Also surfaced before any store mutation.
    #[display("selected folder contains no files")]
    EmptySelection,
    /// A listing entry could not be turned into a record.
    #[display("invalid listing entry: {_0}")]
    InvalidEntry(#[error(not(source))] &'static str),
    /// The catalog store failed; the whole run rolled back.
    #[display("catalog store error")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
