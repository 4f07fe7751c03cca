use crate::error::{ErrorKind, Result};
use crate::page::Page;
use async_trait::async_trait;
use exn::ResultExt;
use magpie_storage::{BackendHandle, StorageBackend};
use tracing::{debug, info, instrument};

/// A step of the build that rewrites a batch of pages in place.
///
/// The batch is only complete once the returned future resolves; anything
/// the processor registers in the output must be written by then.
#[async_trait(?Send)]
pub trait Processor {
    async fn process(&self, pages: &mut [&mut Page]) -> Result<()>;
}

struct Registration {
    extensions: Vec<String>,
    processor: Box<dyn Processor>,
}

/// The pages of one build and the processors that will run over them.
pub struct Site {
    pages: Vec<Page>,
    output: BackendHandle,
    processors: Vec<Registration>,
}

impl Site {
    pub fn new(output: BackendHandle) -> Self {
        Self { pages: Vec::new(), output, processors: Vec::new() }
    }

    pub fn add_page(&mut self, page: Page) -> &mut Self {
        self.pages.push(page);
        self
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, path: impl AsRef<std::path::Path>) -> Option<&Page> {
        let path = path.as_ref();
        self.pages.iter().find(|page| page.path.as_path() == path)
    }

    /// Register `processor` for every page whose path ends with one of
    /// `extensions`.
    pub fn process(&mut self, extensions: impl IntoIterator<Item = impl Into<String>>, processor: impl Processor + 'static) -> &mut Self {
        let extensions = extensions.into_iter().map(Into::into).collect();
        self.processors.push(Registration { extensions, processor: Box::new(processor) });
        self
    }

    /// Read every file of `source` into a page. Returns the number of pages
    /// loaded.
    #[instrument(skip_all, fields(source = source.name()))]
    pub async fn load(&mut self, source: &dyn StorageBackend) -> Result<usize> {
        let load = || ErrorKind::Load(source.name().to_string());
        let files = source.list(None).await.or_raise(load)?;
        for file in &files {
            let content = source.read(&file.path).await.or_raise(load)?;
            self.pages.push(Page::new(file.path.clone(), content));
        }
        debug!(pages = files.len(), "Loaded pages");
        Ok(files.len())
    }

    /// Run every processor, then write every page to the output backend.
    ///
    /// Stops at the first failing processor; nothing is written in that case
    /// except what processors already registered themselves.
    #[instrument(skip_all, fields(output = self.output.name(), pages = self.pages.len()))]
    pub async fn build(&mut self) -> Result<()> {
        for Registration { extensions, processor } in &self.processors {
            let mut batch: Vec<&mut Page> = self.pages.iter_mut().filter(|page| page.matches(extensions)).collect();
            if batch.is_empty() {
                continue;
            }
            debug!(?extensions, pages = batch.len(), "Processing batch");
            processor.process(&mut batch).await.or_raise(|| ErrorKind::Process(extensions.clone()))?;
        }
        for page in &self.pages {
            self.output.write(&page.path, &page.content).await.or_raise(|| ErrorKind::Emit(page.path.clone()))?;
        }
        info!(pages = self.pages.len(), "Site built");
        Ok(())
    }
}
