//! Rewrite Error Types

use derive_more::{Display, Error};

/// A rewrite error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rewrite operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced asset could not be localized; the cache error is a child
    /// frame.
    #[display("could not localize `{attribute}` value {value:?}")]
    Cache {
        attribute: &'static str,
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The interesting part lives in the child frame; let callers inspect it.
        false
    }
}
