use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hash used to derive the file name of a cached asset from its URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// 40 hex characters.
    #[default]
    Sha1,
    /// 64 hex characters.
    Blake3,
}

/// Serialisable configuration record.
///
/// Every field has a default, so any subset may be supplied by a file or the
/// environment.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Suffixes of the documents to process (`".html"`).
    pub extensions: Vec<String>,
    /// URL suffixes the default predicate treats as cacheable, matched
    /// case-sensitively.
    pub cacheable: Vec<String>,
    /// Folder, relative to the site root, that receives cached assets.
    pub folder: String,
    /// Hash used for cached asset file names.
    pub key: KeyAlgorithm,
    /// Print a transient progress line per download.
    pub log_output: bool,
    /// Documents rewritten at once within a batch.
    pub concurrency: usize,
    /// Per-request timeout for downloads, in seconds. No timeout when unset.
    pub timeout: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: vec![".html".to_string()],
            cacheable: [".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp"].map(String::from).to_vec(),
            folder: "cache".to_string(),
            key: KeyAlgorithm::default(),
            log_output: true,
            concurrency: 100,
            timeout: None,
        }
    }
}

impl Settings {
    /// Checks the invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.folder.trim_matches('/').is_empty() {
            exn::bail!(ErrorKind::Invalid("folder must name a directory below the site root".to_string()));
        }
        if self.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("concurrency must be at least 1".to_string()));
        }
        for (field, suffixes) in [("extensions", &self.extensions), ("cacheable", &self.cacheable)] {
            if let Some(bad) = suffixes.iter().find(|suffix| !suffix.starts_with('.') || suffix.len() < 2) {
                exn::bail!(ErrorKind::Invalid(format!("{field} entry `{bad}` must look like `.ext`")));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
