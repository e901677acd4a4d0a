//! # recap-inference
//!
//! Gemini backend for Recap quiz generation.
//!
//! This crate provides:
//! - [`GeminiBackend`], the [`QuizBackend`](recap_core::QuizBackend)
//!   implementation used in production
//! - SSE streaming support for `streamGenerateContent`
//! - The quiz system instruction and structured-output response schema

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiBackend, GeminiConfig, GeminiErrorCode, TextStream};
pub use prompt::{quiz_response_schema, system_instruction};
