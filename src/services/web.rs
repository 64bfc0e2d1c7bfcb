// src/services/web.rs

//! Plain web access: documents, JSON feeds and link checks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::utils::http::check_response;

/// Fetching arbitrary web resources.
#[async_trait]
pub trait WebFetch: Send + Sync {
    /// Body of a successful GET.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Status code of a HEAD request, redirects followed.
    async fn head_status(&self, url: &str) -> Result<u16>;
}

/// [`WebFetch`] over a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: Client,
    head_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, head_timeout_secs: u64) -> Self {
        Self {
            client,
            head_timeout: Duration::from_secs(head_timeout_secs),
        }
    }
}

#[async_trait]
impl WebFetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = check_response(self.client.get(url).send().await?).await?;
        Ok(resp.text().await?)
    }

    async fn head_status(&self, url: &str) -> Result<u16> {
        let resp = self
            .client
            .head(url)
            .timeout(self.head_timeout)
            .send()
            .await?;
        Ok(resp.status().as_u16())
    }
}
