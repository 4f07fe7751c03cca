//! Site Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A site error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for site operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The localizer could not be set up (invalid settings or HTTP client
    /// construction).
    #[display("could not set up asset localization")]
    Setup,
    /// Pages could not be read from the source backend.
    #[display("could not load pages from `{_0}`")]
    Load(#[error(not(source))] String),
    /// A page's asset references could not be localized.
    #[display("could not localize assets of {}", _0.display())]
    Localize(#[error(not(source))] PathBuf),
    /// A registered processor failed; the batch is aborted.
    #[display("processing pages matching {_0:?} failed")]
    Process(#[error(not(source))] Vec<String>),
    /// A page could not be written to the output backend.
    #[display("could not write {}", _0.display())]
    Emit(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Never true: a failed download leaves its path claimed, so a
    /// [`Localizer`](crate::Localizer) (and its cache) must not be reused
    /// after a failure. Retry with a fresh one.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
