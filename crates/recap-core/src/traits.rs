//! Trait seams between the pipeline and its external collaborators.

use async_trait::async_trait;

use crate::models::{OutboundRequest, Quiz};
use crate::Result;

// =============================================================================
// CONTENT FETCHING
// =============================================================================

/// Fetches plain text for the different kinds of attached links.
///
/// Every method may fail; callers that aggregate many links absorb failures.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a web page and return its text with markup stripped.
    async fn fetch_web_page_text(&self, url: &str) -> Result<String>;

    /// Fetch a PDF and return the text of every page in page order.
    async fn fetch_pdf_text(&self, url: &str) -> Result<String>;

    /// Fetch the transcript of a YouTube video.
    async fn fetch_youtube_transcript(&self, video_id: &str) -> Result<String>;
}

// =============================================================================
// AI CLIENT
// =============================================================================

/// A single request to the AI service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    pub message: String,
    pub images: Vec<Vec<u8>>,
    /// Use the streaming endpoint (chunks are concatenated).
    pub streaming: bool,
    /// Ask for JSON constrained to the quiz schema.
    pub structured_output: bool,
}

impl AiRequest {
    /// Non-streaming structured request for quiz generation.
    pub fn quiz(outbound: OutboundRequest) -> Self {
        Self {
            message: outbound.message,
            images: outbound.images,
            streaming: false,
            structured_output: true,
        }
    }
}

/// Backend that turns an [`AiRequest`] into raw response text.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Send a message and return the model's raw response text.
    async fn send_message(&self, request: &AiRequest) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// HISTORY
// =============================================================================

/// Durable storage for the ordered quiz history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the full history. A store with nothing saved yet returns an empty list.
    async fn load(&self) -> Result<Vec<Quiz>>;

    /// Replace the stored history with `history`.
    async fn save(&self, history: &[Quiz]) -> Result<()>;
}
