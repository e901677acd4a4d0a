//! SSE stream parsing for `streamGenerateContent?alt=sse` responses.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use recap_core::{Error, Result};

use super::types::GenerateContentResponse;

/// Stream of generated text chunks.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Parse an SSE byte stream into text chunks.
///
/// Network chunks may split events anywhere, so bytes are buffered and only
/// complete lines are parsed.
pub fn parse_sse_stream(
    stream: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> TextStream {
    let mut buffer = String::new();
    let text_stream = stream
        .map(move |chunk_result| match chunk_result {
            Ok(bytes) => {
                buffer.push_str(&String::from_utf8_lossy(&bytes));
                drain_complete_lines(&mut buffer)
            }
            Err(e) => vec![Err(Error::Inference(format!(
                "Stream error: {}",
                e.without_url()
            )))],
        })
        .flat_map(futures::stream::iter);

    Box::pin(text_stream)
}

/// Collect a text stream into one string, failing on the first error.
pub async fn collect_text(mut stream: TextStream) -> Result<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    Ok(text)
}

/// Parse every complete line in `buffer`, leaving any partial line behind.
fn drain_complete_lines(buffer: &mut String) -> Vec<Result<String>> {
    let Some(last_newline) = buffer.rfind('\n') else {
        return Vec::new();
    };
    let complete: String = buffer.drain(..=last_newline).collect();
    complete.lines().filter_map(parse_sse_line).collect()
}

/// Parse a single SSE line and extract its text.
fn parse_sse_line(line: &str) -> Option<Result<String>> {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(chunk) => {
            let text = chunk.text();
            (!text.is_empty()).then_some(Ok(text))
        }
        Err(e) => Some(Err(Error::Inference(format!(
            "Failed to parse SSE chunk: {}",
            e
        )))),
    }
}
