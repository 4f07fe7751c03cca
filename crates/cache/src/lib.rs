//! Fetch-once cache of remote assets.
//!
//! Site documents reference remote images by absolute URL. This crate decides
//! which of those URLs to keep locally, derives a deterministic local path for
//! each one, downloads every distinct asset exactly once per build and
//! registers it in the build's output set.
//!
//! - [`resolve`]/[`resolve_path`]: pure classification and path derivation.
//! - [`Cache`]: owns the set of generated paths for one build and performs
//!   the fetch-and-register step at most once per path.
//! - [`Fetcher`]: the network seam ([`HttpFetcher`] in production).
//! - [`Progress`]: best-effort, human-facing progress output.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use magpie_cache::{Cache, HttpFetcher, Options};
//! use magpie_storage::backend::MemoryBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Cache::new(Options::default(), Arc::new(HttpFetcher::new(None)?), Arc::new(MemoryBackend::default()));
//! let local = cache.ensure_cached("https://example.test/pic.jpg").await?;
//! assert_eq!(local, "/cache/31c33bdaad775abe578fd7c32c913054fdeed308.jpg");
//! # Ok(())
//! # }
//! ```

mod coordinator;
pub mod error;
mod fetch;
mod options;
mod progress;
mod resolve;

pub use crate::coordinator::Cache;
#[cfg(any(test, feature = "mock"))]
pub use crate::fetch::MockFetcher;
pub use crate::fetch::{Fetcher, FetcherHandle, HttpFetcher};
pub use crate::options::{KeyDeriver, Options, Predicate, blake3_key, https_with_suffix, sha1_key};
pub use crate::progress::{Progress, ProgressHandle, TerminalProgress};
pub use crate::resolve::{Resolution, resolve, resolve_path};
