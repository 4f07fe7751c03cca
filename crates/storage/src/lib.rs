//! The build's output set.
//!
//! Every artifact a build produces (rewritten documents, downloaded remote
//! assets) is registered by writing it to a [`StorageBackend`]. Paths are
//! site-relative (`/cache/ab12.png` and `cache/ab12.png` name the same
//! artifact) and are validated with [`validate_path`] before any I/O.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
