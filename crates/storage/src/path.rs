//! Artifact path validation.
//!
//! Artifact paths arrive in site-URL form (`/cache/ab12.png`) and are mapped
//! onto storage-relative paths (`cache/ab12.png`). Anything that would leave
//! the output root is refused.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates an artifact path and returns its storage-relative form.
///
/// The leading `/` of a site URL is dropped, `.` segments and repeated
/// separators collapse, and `..` is resolved as long as it never climbs above
/// the root. Null bytes are rejected outright.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use magpie_storage::validate_path;
///
/// assert_eq!(validate_path("/cache/ab12.png").unwrap(), Path::new("cache/ab12.png"));
/// assert_eq!(validate_path("blog//./post.html").unwrap(), Path::new("blog/post.html"));
/// assert!(validate_path("/../etc/passwd").is_err());
/// assert!(validate_path("/").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut segments = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => segments.push(segment),
            // Site URLs are rooted at the output directory, not the filesystem.
            Component::RootDir | Component::CurDir => {},
            Component::ParentDir => {
                if segments.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
            Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if segments.is_empty() {
        exn::bail!(invalid());
    }
    Ok(segments.into_iter().collect())
}
