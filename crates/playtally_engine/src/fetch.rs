use std::time::Duration;

use futures_util::StreamExt;
use playtally_core::{ItemId, PageResult};

use crate::decode::decode_plays_page;
use crate::{FailureKind, FetchError, HarvestEvent};

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Endpoint root; the page request is `{base_url}/plays?id=..&page=..`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Bounds each page request so a hung connection aborts the run.
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("playtally/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: HarvestEvent) {}
}

/// One network call per invocation. No throttling, no retries.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, item_id: ItemId, page: u32) -> Result<PageResult, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestPageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn page_url(&self, item_id: ItemId, page: u32) -> Result<reqwest::Url, FetchError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let mut url = reqwest::Url::parse(&format!("{base}/plays"))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("id", &item_id.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, item_id: ItemId, page: u32) -> Result<PageResult, FetchError> {
        let url = self.page_url(item_id, page)?;
        engine_logging::engine_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = self.read_body(response).await?;
        let body = String::from_utf8(bytes)
            .map_err(|err| FetchError::new(FailureKind::MalformedBody, err.to_string()))?;

        decode_plays_page(&body)
            .map_err(|err| FetchError::new(FailureKind::MalformedBody, err.to_string()))
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
