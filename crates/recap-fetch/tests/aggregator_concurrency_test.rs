//! Fork-join behavior of the aggregator with a slow fake fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recap_core::{ContentFetcher, Error, Result};
use recap_fetch::Aggregator;
use tokio::time::Instant;

/// Serves canned page texts after a per-URL delay.
struct DelayedFetcher {
    pages: HashMap<String, (u64, Option<&'static str>)>,
}

impl DelayedFetcher {
    fn new(pages: &[(&str, u64, Option<&'static str>)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, ms, text)| (url.to_string(), (*ms, *text)))
                .collect(),
        }
    }
}

#[async_trait]
impl ContentFetcher for DelayedFetcher {
    async fn fetch_web_page_text(&self, url: &str) -> Result<String> {
        let (delay, text) = self
            .pages
            .get(url)
            .copied()
            .ok_or_else(|| Error::NotFound(url.to_string()))?;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        text.map(str::to_string)
            .ok_or_else(|| Error::Request(format!("{} timed out", url)))
    }

    async fn fetch_pdf_text(&self, url: &str) -> Result<String> {
        Err(Error::Extraction(format!("unexpected pdf {}", url)))
    }

    async fn fetch_youtube_transcript(&self, video_id: &str) -> Result<String> {
        Err(Error::Extraction(format!("unexpected video {}", video_id)))
    }
}

fn links(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_results_keep_link_order() {
    let fetcher = DelayedFetcher::new(&[
        ("https://example.com/a", 300, Some("A")),
        ("https://example.com/b", 10, Some("B")),
        ("https://example.com/c", 150, Some("C")),
    ]);
    let aggregator = Aggregator::new(Arc::new(fetcher));

    let request = aggregator
        .aggregate(
            "",
            vec![],
            &links(&[
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
            ]),
        )
        .await;

    assert_eq!(request.message, "Attached Website Content:ABC");
}

#[tokio::test(start_paused = true)]
async fn test_batch_takes_about_the_slowest_link() {
    let fetcher = DelayedFetcher::new(&[
        ("https://example.com/a", 300, Some("A")),
        ("https://example.com/b", 200, Some("B")),
        ("https://example.com/c", 250, Some("C")),
        ("https://example.com/d", 100, Some("D")),
    ]);
    let aggregator = Aggregator::new(Arc::new(fetcher));

    let start = Instant::now();
    let resolved = aggregator
        .resolve_links(&links(&[
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
            "https://example.com/d",
        ]))
        .await;
    let elapsed = start.elapsed();

    assert_eq!(resolved, vec!["A", "B", "C", "D"]);
    assert!(elapsed >= Duration::from_millis(300));
    assert!(
        elapsed < Duration::from_millis(850),
        "links ran sequentially: {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_link_does_not_affect_siblings() {
    let fetcher = DelayedFetcher::new(&[
        ("https://example.com/a", 50, Some("A")),
        ("https://example.com/fails", 10, None),
        ("https://example.com/c", 100, Some("C")),
    ]);
    let aggregator = Aggregator::new(Arc::new(fetcher));

    let request = aggregator
        .aggregate(
            "Notes. ",
            vec![vec![0xFF, 0xD8]],
            &links(&[
                "https://example.com/a",
                "https://example.com/fails",
                "https://example.com/unknown",
                "https://example.com/c",
            ]),
        )
        .await;

    assert_eq!(request.message, "Notes. Attached Website Content:AC");
    assert_eq!(request.images, vec![vec![0xFF, 0xD8]]);
}
