//! # recap-fetch
//!
//! Resolves attachment links to plain text and composes the outbound message.
//!
//! Links are classified as YouTube videos, PDFs or web pages; each kind is
//! fetched through a [`ContentFetcher`](recap_core::ContentFetcher).
//! [`HttpContentFetcher`] is the production implementation and
//! [`Aggregator`] runs one fork-join batch per request.

pub mod aggregator;
pub mod html;
pub mod http;
pub mod link;
pub mod pdf;
pub mod youtube;

pub use aggregator::{resolve_link, Aggregator};
pub use html::html_to_text;
pub use http::{HttpContentFetcher, HttpFetcherConfig};
pub use link::{classify_link, extract_youtube_video_id, is_valid_url};
pub use pdf::{extract_pdf_text, extract_pdf_text_with, pdftotext_available};
