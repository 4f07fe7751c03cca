//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
    /// The request never produced a complete response (DNS, TLS, connection
    /// reset, timeout, truncated body...).
    #[display("request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The server answered with a non-success status.
    #[display("{url} responded with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Downloading a remote asset failed; the cause is a child frame.
    #[display("could not download {_0}")]
    Fetch(#[error(not(source))] String),
    /// The downloaded asset could not be registered in the output set.
    #[display("could not register cached asset at {_0}")]
    Storage(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Client | Self::Fetch(_) | Self::Storage(_) => false,
        }
    }
}
