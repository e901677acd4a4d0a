//! Attachment aggregation.
//!
//! Every link of a request is resolved to plain text concurrently. The batch
//! is a single fork-join: one task per link, joined before the message is
//! composed. A failing or panicking task contributes empty text and never
//! affects its siblings.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use recap_core::{AttachmentSet, ContentFetcher, LinkKind, OutboundRequest, Result};

use crate::link::{classify_link, extract_youtube_video_id};

/// Resolves attachment links and composes the outbound message.
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn ContentFetcher>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Compose the outbound request for a validated attachment set.
    pub async fn aggregate_set(&self, attachments: &AttachmentSet) -> OutboundRequest {
        self.aggregate(
            attachments.free_text(),
            attachments.images().to_vec(),
            attachments.links(),
        )
        .await
    }

    /// Resolve `links` and join them with `free_text` behind the
    /// attached-content separator. Images pass through untouched.
    pub async fn aggregate(
        &self,
        free_text: &str,
        images: Vec<Vec<u8>>,
        links: &[String],
    ) -> OutboundRequest {
        let start = Instant::now();
        let resolved = self.resolve_links(links).await;
        let request = OutboundRequest::compose(free_text, &resolved, images);

        info!(
            subsystem = "fetch",
            op = "aggregate",
            link_count = links.len(),
            image_count = request.images.len(),
            prompt_len = request.message.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Aggregated attachments"
        );
        request
    }

    /// Resolve every link concurrently. The result has one entry per link,
    /// in link order; unresolvable links yield an empty string.
    pub async fn resolve_links(&self, links: &[String]) -> Vec<String> {
        let mut tasks = JoinSet::new();
        for (index, link) in links.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let link = link.clone();
            tasks.spawn(async move { (index, resolve_link(fetcher.as_ref(), &link).await) });
        }

        let mut slots = vec![String::new(); links.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, text)) => slots[index] = text,
                Err(e) => warn!(
                    subsystem = "fetch",
                    op = "resolve_link",
                    error = %e,
                    "Link task failed, using empty text"
                ),
            }
        }
        slots
    }
}

/// Resolve a single link, absorbing any failure into empty text.
pub async fn resolve_link(fetcher: &dyn ContentFetcher, link: &str) -> String {
    let kind = classify_link(link);
    let result = match kind {
        LinkKind::Invalid => {
            debug!(link, "Skipping invalid link");
            return String::new();
        }
        LinkKind::YouTube => match extract_youtube_video_id(link) {
            Some(video_id) => {
                debug!(link, video_id = %video_id, "Fetching transcript");
                fetcher.fetch_youtube_transcript(&video_id).await
            }
            None => {
                warn!(link, link_kind = %kind, "No video id in YouTube link, using empty text");
                return String::new();
            }
        },
        LinkKind::Pdf => fetcher.fetch_pdf_text(link).await,
        LinkKind::WebPage => fetcher.fetch_web_page_text(link).await,
    };
    absorb(link, kind, result)
}

fn absorb(link: &str, kind: LinkKind, result: Result<String>) -> String {
    match result {
        Ok(text) => {
            debug!(link, link_kind = %kind, chars = text.len(), "Resolved link");
            text
        }
        Err(e) => {
            warn!(link, link_kind = %kind, error = %e, "Failed to resolve link, using empty text");
            String::new()
        }
    }
}
