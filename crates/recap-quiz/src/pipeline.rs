//! Quiz generation pipeline: aggregate, ask the model once, decode.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use recap_core::{AiRequest, AttachmentSet, DecodeOutcome, Quiz, QuizBackend, Result};
use recap_fetch::Aggregator;

use crate::decoder::QuizDecoder;

/// Runs one quiz-generation request end to end.
pub struct QuizPipeline {
    aggregator: Aggregator,
    backend: Arc<dyn QuizBackend>,
    decoder: QuizDecoder,
    streaming: bool,
}

impl QuizPipeline {
    pub fn new(aggregator: Aggregator, backend: Arc<dyn QuizBackend>, decoder: QuizDecoder) -> Self {
        Self {
            aggregator,
            backend,
            decoder,
            streaming: false,
        }
    }

    /// Use the backend's streaming endpoint.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Generate a quiz from a validated attachment set.
    ///
    /// Backend errors are classified like any other failed response. A
    /// successful quiz records the attachments it was generated from.
    pub async fn generate(&self, attachments: &AttachmentSet) -> DecodeOutcome {
        let start = Instant::now();
        let outbound = self.aggregator.aggregate_set(attachments).await;

        let mut request = AiRequest::quiz(outbound);
        request.streaming = self.streaming;

        let raw = match self.backend.send_message(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    subsystem = "quiz",
                    op = "generate",
                    model = self.backend.model_name(),
                    error = %e,
                    "Backend request failed"
                );
                e.to_string()
            }
        };

        let outcome = match self.decoder.decode(&raw) {
            DecodeOutcome::Success(quiz) => DecodeOutcome::Success(quiz.with_attachments(attachments)),
            failure => failure,
        };

        info!(
            subsystem = "quiz",
            op = "generate",
            model = self.backend.model_name(),
            question_count = outcome.quiz().map_or(0, |quiz| quiz.questions.len()),
            success = outcome.is_success(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Quiz generation finished"
        );
        outcome
    }

    /// Generate a fresh quiz from the attachments a stored quiz recorded.
    pub async fn regenerate(&self, quiz: &Quiz) -> Result<DecodeOutcome> {
        let attachments = AttachmentSet::from_quiz(quiz)?;
        Ok(self.generate(&attachments).await)
    }
}
