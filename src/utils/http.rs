// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Maximum redirect hops followed per request.
const MAX_REDIRECTS: usize = 10;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()?;
    Ok(client)
}

/// Source of page bodies for the extractors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return its body. Non-2xx responses are errors.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl PageFetcher for reqwest::Client {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(url, status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
