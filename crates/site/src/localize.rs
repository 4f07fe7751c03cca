use crate::error::{ErrorKind, Result};
use crate::page::Page;
use crate::site::{Processor, Site};
use async_trait::async_trait;
use exn::ResultExt;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use magpie_cache::{Cache, HttpFetcher, Options};
use magpie_config::Settings;
use magpie_rewrite::{Rewrite, rewrite};
use magpie_storage::BackendHandle;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Pages localized at once unless configured otherwise.
pub const MAX_PROCESS_CONCURRENCY: usize = 100;

/// [`Processor`] that downloads the remote assets referenced by each page and
/// rewrites the references to the local copies.
///
/// One `Localizer` owns one [`Cache`], so every batch it processes shares
/// the same set of generated paths: an asset is downloaded once per build no
/// matter how many pages or batches reference it.
///
/// Paths stay claimed when their download fails. Once [`process`](Processor::process)
/// has failed, drop the localizer; a second run would point pages at assets
/// that were never written.
pub struct Localizer {
    cache: Cache,
    concurrency: usize,
}

impl Localizer {
    pub fn new(cache: Cache) -> Self {
        Self { cache, concurrency: MAX_PROCESS_CONCURRENCY }
    }

    /// Build a localizer fetching over HTTPS and writing assets to `output`.
    ///
    /// `settings` are validated first; an empty folder, for one, would derive
    /// protocol-relative paths (`//<key>.png`).
    pub fn from_settings(settings: &Settings, output: BackendHandle) -> Result<Self> {
        settings.validate().or_raise(|| ErrorKind::Setup)?;
        let fetcher = HttpFetcher::new(settings.timeout()).or_raise(|| ErrorKind::Setup)?;
        let cache = Cache::new(Options::from(settings), Arc::new(fetcher), output);
        Ok(Self::new(cache).with_concurrency(settings.concurrency))
    }

    /// Maximum number of pages in flight; zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Register with `site` for the configured document extensions.
    pub fn register(self, site: &mut Site) -> &mut Site {
        let extensions = self.cache.options().extensions.clone();
        site.process(extensions, self)
    }

    async fn localize_page(&self, page: &mut Page) -> Result<()> {
        let Some(html) = page.text() else {
            debug!(path = %page.path.display(), "Skipping non UTF-8 page");
            return Ok(());
        };
        let localized = rewrite(&self.cache, html).await.or_raise(|| ErrorKind::Localize(page.path.clone()))?;
        if let Rewrite::Rewritten(html) = localized {
            page.content = html.into_bytes();
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Processor for Localizer {
    /// Localize every page, at most `concurrency` at a time.
    ///
    /// The first failure aborts the batch: pages still in flight are dropped
    /// and the progress line is left as-is.
    #[instrument(skip_all, fields(pages = pages.len()))]
    async fn process(&self, pages: &mut [&mut Page]) -> Result<()> {
        let mut pending = pages.iter_mut().map(|page| self.localize_page(page));
        let mut processing: FuturesUnordered<_> = pending.by_ref().take(self.concurrency).collect();
        while let Some(result) = processing.next().await {
            result?;
            // Promote the next page, FIFO.
            if let Some(next) = pending.next() {
                processing.push(next);
            }
        }
        self.cache.finish();
        debug!(generated = self.cache.len(), "Batch localized");
        Ok(())
    }
}
