//! Assist Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Nothing in here ever reaches the rest of the system: the public entry
//! points catch every kind and degrade to a neutral result. The kinds exist
//! for the log line that explains *why* a suggestion didn't happen.

use derive_more::{Display, Error};

/// An assist error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for assist operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No API key configured; requests are skipped entirely.
    #[display("no API key configured")]
    MissingApiKey,
    /// The request never completed (DNS, connect, TLS, timeout).
    #[display("request failed")]
    Http,
    /// The service answered with a non-success status.
    #[display("service returned HTTP {_0}")]
    Api(#[error(not(source))] u16),
    /// The service answered 200 but the body wasn't usable.
    #[display("malformed response")]
    MalformedResponse,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http)
    }
}
