//! HTTP implementation of [`ContentFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use recap_core::defaults::{FETCH_USER_AGENT, YOUTUBE_URL};
use recap_core::{ContentFetcher, Error, Result};

use crate::html::html_to_text;
use crate::pdf::{extract_pdf_text_with, pdftotext_available, PDFTOTEXT};
use crate::youtube::{caption_track_url, parse_timedtext};

/// Default per-request timeout for content fetches.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`HttpContentFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Base URL of YouTube watch pages.
    pub youtube_base_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// `pdftotext` program used for PDF links.
    pub pdftotext: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            youtube_base_url: YOUTUBE_URL.to_string(),
            user_agent: FETCH_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
            pdftotext: PDFTOTEXT.to_string(),
        }
    }
}

/// Fetches web pages, PDFs and YouTube transcripts over HTTP.
pub struct HttpContentFetcher {
    client: Client,
    config: HttpFetcherConfig,
    pdf_support: OnceCell<bool>,
}

impl HttpContentFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Request(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing content fetcher: youtube={}, timeout={}s",
            config.youtube_base_url, config.timeout_seconds
        );

        Ok(Self {
            client,
            config,
            pdf_support: OnceCell::new(),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpFetcherConfig::default())
    }

    pub fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    /// Whether PDF links can be extracted. Probed once, on first use.
    pub async fn pdf_supported(&self) -> bool {
        *self
            .pdf_support
            .get_or_init(|| async {
                let available = pdftotext_available(&self.config.pdftotext).await;
                if !available {
                    warn!(
                        program = %self.config.pdftotext,
                        "pdftotext not found, PDF links will contribute empty text"
                    );
                }
                available
            })
            .await
    }

    /// GET a URL, failing on non-success status.
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request(format!("GET {} returned {}", url, status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_web_page_text(&self, url: &str) -> Result<String> {
        let bytes = self.get(url).await?.bytes().await?;
        let html = String::from_utf8_lossy(&bytes);
        let text = html_to_text(&html);
        debug!(url, bytes = bytes.len(), chars = text.len(), "Fetched web page");
        Ok(text)
    }

    async fn fetch_pdf_text(&self, url: &str) -> Result<String> {
        if !self.pdf_supported().await {
            return Err(Error::Extraction(format!(
                "{} is not installed",
                self.config.pdftotext
            )));
        }
        let bytes = self.get(url).await?.bytes().await?;
        debug!(url, bytes = bytes.len(), "Fetched PDF");
        extract_pdf_text_with(&self.config.pdftotext, &bytes).await
    }

    async fn fetch_youtube_transcript(&self, video_id: &str) -> Result<String> {
        let watch_url = format!(
            "{}/watch?v={}",
            self.config.youtube_base_url.trim_end_matches('/'),
            video_id
        );
        let watch_page = self.get(&watch_url).await?.text().await?;

        let track_url = caption_track_url(&watch_page).ok_or_else(|| {
            Error::NotFound(format!("No caption tracks for video {}", video_id))
        })?;

        let xml = self.get(&track_url).await?.text().await?;
        let transcript = parse_timedtext(&xml);
        if transcript.is_empty() {
            return Err(Error::Extraction(format!(
                "Empty transcript for video {}",
                video_id
            )));
        }

        debug!(video_id, chars = transcript.len(), "Fetched transcript");
        Ok(transcript)
    }
}
