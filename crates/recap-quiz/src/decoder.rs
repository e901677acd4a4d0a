//! Quiz response decoding and error classification.
//!
//! A raw model response either parses as a quiz or is classified by an
//! ordered table of vendor phrases. The first phrase found anywhere in the
//! raw text decides the category.

use tracing::{debug, warn};

use recap_core::defaults::{
    PHRASE_INVALID_API_KEY, PHRASE_MODEL_OVERLOADED, PHRASE_RATE_LIMITED,
    PHRASE_REGION_RESTRICTED,
};
use recap_core::{DecodeOutcome, ErrorCategory, ErrorPhrase, Preferences, Quiz, Result};

/// Ordered (phrase, category) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassifier {
    phrases: Vec<ErrorPhrase>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(default_phrases())
    }
}

impl ErrorClassifier {
    pub fn new(phrases: Vec<ErrorPhrase>) -> Self {
        Self { phrases }
    }

    /// Default table followed by `extra` phrases.
    pub fn with_extra(extra: &[ErrorPhrase]) -> Self {
        let mut classifier = Self::default();
        classifier.phrases.extend(extra.iter().cloned());
        classifier
    }

    /// Default table extended with the phrases from the preferences file.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self::with_extra(prefs.error_phrases())
    }

    pub fn phrases(&self) -> &[ErrorPhrase] {
        &self.phrases
    }

    /// Append a phrase at the lowest precedence.
    pub fn push(&mut self, phrase: ErrorPhrase) {
        self.phrases.push(phrase);
    }

    /// Category of a raw response that is not a quiz.
    ///
    /// Without a matching phrase, text that is valid JSON (just not a quiz)
    /// is `MalformedResponse` and anything else is `Unknown`.
    pub fn classify(&self, raw: &str) -> ErrorCategory {
        if let Some(phrase) = self
            .phrases
            .iter()
            .find(|phrase| !phrase.pattern.is_empty() && raw.contains(&phrase.pattern))
        {
            return phrase.category;
        }

        if serde_json::from_str::<serde_json::Value>(raw.trim()).is_ok() {
            ErrorCategory::MalformedResponse
        } else {
            ErrorCategory::Unknown
        }
    }
}

/// Built-in vendor phrases, in precedence order.
pub fn default_phrases() -> Vec<ErrorPhrase> {
    vec![
        ErrorPhrase::new(PHRASE_RATE_LIMITED, ErrorCategory::RateLimited),
        ErrorPhrase::new(PHRASE_REGION_RESTRICTED, ErrorCategory::RegionRestricted),
        ErrorPhrase::new(PHRASE_INVALID_API_KEY, ErrorCategory::InvalidApiKey),
        ErrorPhrase::new(PHRASE_MODEL_OVERLOADED, ErrorCategory::ModelOverloaded),
    ]
}

/// Turns raw model text into a [`DecodeOutcome`].
#[derive(Debug, Clone, Default)]
pub struct QuizDecoder {
    classifier: ErrorClassifier,
}

impl QuizDecoder {
    pub fn new(classifier: ErrorClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Parse `raw` as a quiz, or classify why it is not one.
    pub fn decode(&self, raw: &str) -> DecodeOutcome {
        match serde_json::from_str::<Quiz>(raw.trim()) {
            Ok(quiz) => {
                debug!(
                    subsystem = "quiz",
                    op = "decode",
                    question_count = quiz.questions.len(),
                    "Decoded quiz"
                );
                DecodeOutcome::Success(quiz)
            }
            Err(e) => {
                let category = self.classifier.classify(raw);
                warn!(
                    subsystem = "quiz",
                    op = "decode",
                    category = %category,
                    response_len = raw.len(),
                    error = %e,
                    "Response is not a quiz"
                );
                DecodeOutcome::Failure(category)
            }
        }
    }
}

/// Decode with the built-in classification table.
pub fn decode(raw: &str) -> DecodeOutcome {
    QuizDecoder::default().decode(raw)
}

/// Serialize a quiz in the format [`decode`] accepts.
pub fn encode_quiz(quiz: &Quiz) -> Result<String> {
    Ok(serde_json::to_string(quiz)?)
}
