//! Shared quiz import and export.
//!
//! A shared quiz travels as `{"quiz": {...}}`. Imports always arrive
//! unanswered: any recorded answers in the payload are dropped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use recap_core::{ErrorCategory, Quiz};

/// Why a shared quiz could not be loaded.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not a `{"quiz": {...}}` wrapper around a valid quiz.
    #[error("Malformed shared quiz: {0}")]
    Malformed(String),

    /// The payload could not be read.
    #[error("Failed to read shared quiz: {0}")]
    Unreadable(String),
}

impl DecodeError {
    /// Category reported to the user.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DecodeError::Malformed(_) => ErrorCategory::MalformedResponse,
            DecodeError::Unreadable(_) => ErrorCategory::Unknown,
        }
    }
}

#[derive(Deserialize)]
struct SharedQuiz {
    quiz: Quiz,
}

#[derive(Serialize)]
struct SharedQuizRef<'a> {
    quiz: &'a Quiz,
}

/// Decode a shared quiz payload, clearing any recorded answers.
pub fn load_shared_quiz(bytes: &[u8]) -> Result<Quiz, DecodeError> {
    let SharedQuiz { mut quiz } =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    quiz.clear_answers();
    debug!(
        subsystem = "quiz",
        op = "load_shared_quiz",
        question_count = quiz.questions.len(),
        "Loaded shared quiz"
    );
    Ok(quiz)
}

/// Encode a quiz in the shared `{"quiz": ...}` wrapper.
pub fn export_shared_quiz(quiz: &Quiz) -> Result<Vec<u8>, DecodeError> {
    serde_json::to_vec_pretty(&SharedQuizRef { quiz })
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Load a shared quiz from a local file or an `http(s)` URL.
pub async fn load_shared_quiz_from(source: &str) -> Result<Quiz, DecodeError> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        info!(source, "Fetching shared quiz");
        fetch_bytes(source).await?
    } else {
        info!(source, "Reading shared quiz");
        tokio::fs::read(Path::new(source))
            .await
            .map_err(|e| DecodeError::Unreadable(format!("{}: {}", source, e)))?
    };
    load_shared_quiz(&bytes)
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, DecodeError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| DecodeError::Unreadable(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(DecodeError::Unreadable(format!(
            "GET {} returned {}",
            url, status
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DecodeError::Unreadable(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "quiz": {
            "quiz_title": "Capitals",
            "questions": [
                {"question": "Capital of France?", "type": "multiple_choice",
                 "options": [{"text": "Paris", "correct": true}, {"text": "Lyon", "correct": false}]}
            ],
            "userPrompt": "capitals",
            "userAnswers": [
                {"question": {"question": "Capital of France?", "type": "multiple_choice"},
                 "userAnswer": ["Lyon"], "isCorrect": false}
            ]
        }
    }"#;

    #[test]
    fn test_import_clears_answers() {
        let quiz = load_shared_quiz(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(quiz.title, "Capitals");
        assert_eq!(quiz.user_prompt.as_deref(), Some("capitals"));
        assert!(quiz.user_answers.is_none());
        assert!(!quiz.is_answered());
    }

    #[test]
    fn test_missing_wrapper_is_malformed() {
        let err = load_shared_quiz(br#"{"quiz_title": "T", "questions": []}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert_eq!(err.category(), ErrorCategory::MalformedResponse);
    }

    #[test]
    fn test_non_object_wrapper_is_malformed() {
        for payload in [r#"{"quiz": "nope"}"#, r#"{"quiz": []}"#, "[]", "not json"] {
            let err = load_shared_quiz(payload.as_bytes()).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::MalformedResponse, "{}", payload);
        }
    }

    #[test]
    fn test_export_wraps_quiz() {
        let quiz = load_shared_quiz(PAYLOAD.as_bytes()).unwrap();
        let bytes = export_shared_quiz(&quiz).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["quiz"]["quiz_title"], "Capitals");

        assert_eq!(load_shared_quiz(&bytes).unwrap(), quiz);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.json");
        std::fs::write(&path, PAYLOAD).unwrap();

        let quiz = load_shared_quiz_from(path.to_str().unwrap()).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let err = load_shared_quiz_from("/definitely/not/here.json")
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
        assert_eq!(err.category(), ErrorCategory::Unknown);
    }
}
