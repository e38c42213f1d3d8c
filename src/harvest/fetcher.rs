//! Profile comments API integration
//!
//! Thin I/O boundary: one call fetches one page of one account's comments.
//!
//! ## API Reference
//!
//! Endpoint: `{api_base}/profiles/{account_id}/comments/?unsafe=true&limit={L}&offset={O}`
//! Returns: `{ "count": <approximate total>, "data": [ <comment>, ... ] }`
//!
//! `unsafe=true` exposes moderated and banned comments as well, which is
//! what we want: banned high-engagement comments are part of the sample.
//!
//! Each comment is kept as raw JSON in `RawPage::data` and decoded one by
//! one with `RawRecord::decode`, so a single malformed entry never costs
//! the rest of the page.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: HTTP {0}")]
    Status(u16),
}

/// One page of the comments listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    /// Approximate total reported by the server (progress only)
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRating {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
    #[serde(default)]
    pub user_vote: i64,
}

/// A comment as delivered by the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub id: u64,
    #[serde(default)]
    pub rating: RawRating,
    pub status: String,
    #[serde(default)]
    pub ban: Option<bool>,
    pub date_added: String,
    pub article_path: String,
}

impl RawRecord {
    /// Decode a single entry of `RawPage::data`
    pub fn decode(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        RawRecord::deserialize(value)
    }
}

/// The fields a scan decision needs: engagement and age
#[derive(Debug, Clone, Deserialize)]
pub struct RawStamp {
    #[serde(default)]
    pub rating: RawRating,
    pub date_added: String,
}

impl RawStamp {
    pub fn decode(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        RawStamp::deserialize(value)
    }
}

/// Source of comment pages
///
/// Implemented over HTTP by `HttpPageFetcher`; tests substitute a
/// scripted in-memory fetcher.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch up to `limit` comments of `account_id` starting at `offset`
    async fn fetch_page(
        &self,
        account_id: u64,
        limit: u32,
        offset: u64,
    ) -> Result<RawPage, FetchError>;
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub api_base: String,
    pub site_url: String,
    pub timeout: Duration,
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// `PageFetcher` backed by a cookie-keeping `reqwest` client
pub struct HttpPageFetcher {
    client: reqwest::Client,
    api_base: String,
    site_url: String,
}

impl HttpPageFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            site_url: settings.site_url.trim_end_matches('/').to_string(),
        })
    }

    /// Visit the site root once so the cookie jar holds a session
    pub async fn warm_up(&self) -> Result<(), FetchError> {
        let response = self.client.get(&self.site_url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        log::info!("🍪 Session cookies acquired from {}", self.site_url);
        Ok(())
    }

    fn page_url(&self, account_id: u64) -> String {
        format!("{}/profiles/{}/comments/", self.api_base, account_id)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        account_id: u64,
        limit: u32,
        offset: u64,
    ) -> Result<RawPage, FetchError> {
        let limit = limit.to_string();
        let offset = offset.to_string();

        let response = self
            .client
            .get(self.page_url(account_id))
            .query(&[
                ("unsafe", "true"),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let page: RawPage = response.json().await?;
        Ok(page)
    }
}
