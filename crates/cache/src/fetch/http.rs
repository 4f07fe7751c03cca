use super::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use std::time::Duration;
use tracing::{instrument, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// [`Fetcher`] over HTTPS using a single pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher, optionally bounding every request by `timeout`.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let request = || ErrorKind::Request(url.to_string());
        let response = self.client.get(url).send().await.or_raise(request)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Remote asset unavailable");
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16() });
        }
        let body = response.bytes().await.or_raise(request)?;
        Ok(body.to_vec())
    }
}
