use super::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Scripted [`Fetcher`] for tests.
///
/// Every call is recorded before the fetch yields, so concurrent callers can
/// observe exactly how many downloads were started. Unknown URLs answer 404
/// unless a fallback body is set.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Vec<u8>>,
    fallback: Option<Vec<u8>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    /// Answer every unscripted URL with `body`.
    pub fn with_fallback(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.fallback = Some(body.into());
        self
    }

    /// Number of fetches started for `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;
        // Give other tasks a chance to interleave, as a real request would.
        tokio::task::yield_now().await;
        match self.responses.get(url).or(self.fallback.as_ref()) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(ErrorKind::Status { url: url.to_string(), status: 404 }),
        }
    }
}
