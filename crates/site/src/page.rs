use std::path::{Path, PathBuf};

/// One output unit of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path relative to the output root.
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl Page {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), content: content.into() }
    }

    /// Whether the page path ends with one of `extensions` (e.g. `".html"`).
    pub fn matches(&self, extensions: &[String]) -> bool {
        let path = self.path.to_string_lossy();
        extensions.iter().any(|extension| path.ends_with(extension.as_str()))
    }

    /// The content as a document, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
