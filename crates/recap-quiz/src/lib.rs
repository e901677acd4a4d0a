//! # recap-quiz
//!
//! Turns attachments into quizzes and keeps them.
//!
//! This crate provides:
//! - [`QuizDecoder`] and the ordered [`ErrorClassifier`] table
//! - Shared quiz import and export (`{"quiz": ...}` payloads)
//! - [`History`] over a [`JsonHistoryStore`]
//! - [`QuizPipeline`], which aggregates attachments, calls the backend once
//!   and decodes the response

pub mod decoder;
pub mod history;
pub mod pipeline;
pub mod share;

pub use decoder::{decode, default_phrases, encode_quiz, ErrorClassifier, QuizDecoder};
pub use history::{History, JsonHistoryStore};
pub use pipeline::QuizPipeline;
pub use share::{export_shared_quiz, load_shared_quiz, load_shared_quiz_from, DecodeError};
