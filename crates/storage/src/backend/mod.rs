//! Storage backend trait and implementations.
//!
//! A build writes its output through a [`StorageBackend`]: either straight to
//! a directory on disk ([`LocalBackend`]) or into memory ([`MemoryBackend`])
//! when another stage consumes the output in-process.

mod local;
mod memory;

pub use self::local::LocalBackend;
pub use self::memory::MemoryBackend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for the build's output set.
///
/// Registering an output artifact is a [`write()`](Self::write); later stages
/// (and tests) read it back by the same path.
///
/// # Path Handling
/// All paths are relative to the output root and are validated using
/// [`validate_path`](crate::validate_path) before use. A site URL such as
/// `/cache/ab12.png` is accepted as-is.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use magpie_storage::{backend::StorageBackend, error::Result};
///
/// async fn register(output: &dyn StorageBackend, bytes: &[u8]) -> Result<()> {
///     let path = Path::new("/cache/0a1b2c.png");
///     if !output.exists(path).await? {
///         output.write(path, bytes).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List every artifact, optionally restricted to a path prefix.
    ///
    /// Default implementation collects [`list_stream()`](Self::list_stream)
    /// into a [`Vec`].
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream artifact metadata, optionally restricted to a path prefix.
    ///
    /// The prefix is component-based: `blog` matches `blog/index.html` but
    /// not `blogroll.html`.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(None);
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Check if an artifact exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read an artifact's contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is no
    /// artifact at `path`.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Register an artifact, replacing any previous contents at `path`.
    ///
    /// # Notes
    /// - Implementations create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
