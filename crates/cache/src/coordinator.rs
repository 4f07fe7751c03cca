use crate::error::{ErrorKind, Result};
use crate::fetch::FetcherHandle;
use crate::options::Options;
use crate::progress::{ProgressHandle, TerminalProgress};
use crate::resolve::{Resolution, resolve};
use exn::ResultExt;
use magpie_storage::BackendHandle;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fetch-once cache for one build.
///
/// Holds the set of local paths already generated during this build. A path
/// is claimed (inserted) before its download starts, so any number of
/// concurrent requests for the same URL start exactly one fetch; the others
/// return the local path straight away. Entries are never removed, even when
/// the fetch that claimed them fails.
pub struct Cache {
    options: Options,
    fetcher: FetcherHandle,
    output: BackendHandle,
    progress: Option<ProgressHandle>,
    generated: Mutex<HashSet<String>>,
}

impl Cache {
    /// Create a cache writing downloaded assets into `output`.
    ///
    /// Progress goes to the terminal when [`Options::log_output`] is set.
    pub fn new(options: Options, fetcher: FetcherHandle, output: BackendHandle) -> Self {
        let progress: Option<ProgressHandle> = options.log_output.then(|| Arc::new(TerminalProgress::new()) as ProgressHandle);
        Self { options, fetcher, output, progress, generated: Mutex::new(HashSet::new()) }
    }

    /// Replace the progress sink; `None` silences progress regardless of
    /// [`Options::log_output`].
    pub fn with_progress(mut self, progress: Option<ProgressHandle>) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Return the value `url` should be replaced with, downloading the asset
    /// into the output set on first sight.
    ///
    /// Empty input yields an empty string and non-cacheable URLs come back
    /// unchanged; neither touches the network.
    ///
    /// # Errors
    ///
    /// - [`Fetch`](ErrorKind::Fetch) if the download fails. The path stays
    ///   claimed, so later calls for the same URL return it without retrying.
    /// - [`Storage`](ErrorKind::Storage) if the artifact cannot be written.
    #[instrument(skip(self), level = "debug")]
    pub async fn ensure_cached(&self, url: &str) -> Result<String> {
        let (url, path) = match resolve(url, &self.options) {
            Resolution::Cached { url, path } => (url, path),
            other => return Ok(other.into_path()),
        };
        // Check-and-claim must happen before the first await.
        if !self.generated.lock().insert(path.clone()) {
            debug!(%path, "Already cached");
            return Ok(path);
        }
        if let Some(progress) = &self.progress {
            progress.caching(url, &path);
        }
        info!(%url, %path, "Caching remote asset");
        let bytes = self.fetcher.fetch(url).await.or_raise(|| ErrorKind::Fetch(url.to_string()))?;
        self.output
            .write(Path::new(&path), &bytes)
            .await
            .or_raise(|| ErrorKind::Storage(path.clone()))?;
        Ok(path)
    }

    /// Sorted snapshot of every path generated so far.
    pub fn generated(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.generated.lock().iter().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.generated.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.lock().is_empty()
    }

    /// Close the progress line at the end of a batch.
    pub fn finish(&self) {
        if let Some(progress) = &self.progress {
            progress.finish();
        }
    }
}
