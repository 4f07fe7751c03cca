//! Local filesystem storage backend.
//!
//! Writes the build's output into a directory on disk using `tokio::fs`.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// All artifact paths are relative to the configured root directory, which is
/// usually the site's output directory.
///
/// # Examples
///
/// ```no_run
/// use magpie_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("public", "/srv/www/public")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend rooted at an absolute path.
    ///
    /// The root directory is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is relative
    /// or points at something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Runs once per build; not worth making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Validate an artifact path and join it onto the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path under the root back to an artifact path.
    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{}` is not within root `{}`", absolute.display(), self.root.display()))
        })?;
        validate_path(relative)
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classify one directory entry so the walk loop can stay free of `?`.
    async fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let relative = self.relative_path(&path)?;
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
        {
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(FileInfo::new(relative, metadata.len())));
        }
        // Most likely a broken symlink.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };
        // Start from the prefix's parent so unrelated subtrees are never read.
        let start_dir = validated_prefix
            .as_deref()
            .and_then(|prefix| self.root.join(prefix).parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.root.clone());
        let mut stack = vec![start_dir];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };
                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.process_entry(entry, validated_prefix.as_deref()).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        tracing::trace!(backend = %self.name, path = %abs_path.display(), bytes = data.len(), "Writing artifact");
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("public", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("public", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("public", "relative/path").is_err());
        assert!(LocalBackend::new("public", "./relative").is_err());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();
        assert!(LocalBackend::new("public", &file).is_err());
    }

    #[test]
    fn test_absolute_path_accepts_site_urls() {
        let (dir, backend) = setup();
        assert_eq!(backend.absolute_path("/cache/ab.png").unwrap(), dir.path().join("cache/ab.png"));
        assert!(backend.absolute_path("/../etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_write_creates_directories_and_reads_back() {
        let (dir, backend) = setup();
        backend.write(Path::new("/cache/ab.png"), b"png").await.unwrap();
        assert!(dir.path().join("cache/ab.png").is_file());
        assert_eq!(backend.read(Path::new("cache/ab.png")).await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_exists() {
        let (_dir, backend) = setup();
        assert!(!backend.exists(Path::new("index.html")).await.unwrap());
        backend.write(Path::new("index.html"), b"<html>").await.unwrap();
        assert!(backend.exists(Path::new("index.html")).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, backend) = setup();
        let err = backend.read(Path::new("missing.html")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_walks_subdirectories() {
        let (_dir, backend) = setup();
        backend.write(Path::new("index.html"), b"a").await.unwrap();
        backend.write(Path::new("blog/post.html"), b"bb").await.unwrap();
        backend.write(Path::new("blog/2024/old.html"), b"ccc").await.unwrap();
        let mut files = backend.list(None).await.unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(
            files,
            vec![
                FileInfo::new("blog/2024/old.html", 3),
                FileInfo::new("blog/post.html", 2),
                FileInfo::new("index.html", 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_with_prefix_is_component_based() {
        let (_dir, backend) = setup();
        backend.write(Path::new("blog/post.html"), b"a").await.unwrap();
        backend.write(Path::new("blogroll.html"), b"b").await.unwrap();
        let files = backend.list(Some(Path::new("blog"))).await.unwrap();
        assert_eq!(files, vec![FileInfo::new("blog/post.html", 1)]);
    }

    #[tokio::test]
    async fn test_list_with_prefix_skips_unrelated_subtrees() {
        let (dir, backend) = setup();
        backend.write(Path::new("cache/ab.png"), b"png").await.unwrap();
        backend.write(Path::new("blog/2024/old.html"), b"a").await.unwrap();
        backend.write(Path::new("blog/post.html"), b"b").await.unwrap();
        std::fs::create_dir_all(dir.path().join("private")).unwrap();
        std::fs::write(dir.path().join("private/secret.html"), b"c").unwrap();
        let files = backend.list(Some(Path::new("blog/2024"))).await.unwrap();
        assert_eq!(files, vec![FileInfo::new("blog/2024/old.html", 1)]);
        let files = backend.list(Some(Path::new("/cache"))).await.unwrap();
        assert_eq!(files, vec![FileInfo::new("cache/ab.png", 3)]);
    }

    #[tokio::test]
    async fn test_list_with_missing_prefix_is_empty() {
        let (_dir, backend) = setup();
        backend.write(Path::new("index.html"), b"a").await.unwrap();
        assert!(backend.list(Some(Path::new("missing/deeper"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_security() {
        let (_dir, backend) = setup();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("cache/../../escape"), b"data").await.is_err());
    }
}
