//! Google Gemini backend.
//!
//! Quiz requests go to `models/{model}:generateContent`, or to
//! `models/{model}:streamGenerateContent?alt=sse` when streaming, in which
//! case the streamed chunks are concatenated into one response.
//!
//! # Example
//!
//! ```rust,no_run
//! use recap_core::{AiRequest, OutboundRequest, Preferences, QuizBackend};
//! use recap_inference::gemini::GeminiBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let prefs = Preferences::load_default().unwrap();
//!     let backend = GeminiBackend::from_preferences(&prefs).unwrap();
//!
//!     let request = AiRequest::quiz(OutboundRequest {
//!         message: "Quiz me on the water cycle.Attached Website Content:".to_string(),
//!         images: vec![],
//!     });
//!     let raw = backend.send_message(&request).await.unwrap();
//!     println!("{}", raw);
//! }
//! ```

mod backend;
mod error;
mod streaming;
mod types;

pub use backend::{
    GeminiBackend, GeminiConfig, HARM_CATEGORIES, THRESHOLD_FILTERED, THRESHOLD_UNFILTERED,
};
pub use error::{to_recap_error, GeminiErrorCode};
pub use streaming::{collect_text, parse_sse_stream, TextStream};
pub use types::*;
