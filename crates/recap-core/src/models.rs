//! Domain models: attachments, outbound requests, quizzes, and decode outcomes.
//!
//! Quiz JSON field names (`quiz_title`, `userPrompt`, `isCorrect`, ...) match
//! the stored history and share format, so these types read and write
//! existing files unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    ATTACHED_CONTENT_SEPARATOR, CODE_FENCE, CODE_FENCE_PLACEHOLDER, MAX_LINKS, MULTIPLE_CHOICE,
};
use crate::error::{Error, Result};

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// User-supplied context for one quiz-generation request.
///
/// Invariants: at most [`MAX_LINKS`] links, and at least one of free text,
/// images or links present. Both are checked on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    free_text: Option<String>,
    images: Vec<Vec<u8>>,
    links: Vec<String>,
}

impl AttachmentSet {
    /// Create a validated attachment set.
    pub fn new(free_text: Option<String>, images: Vec<Vec<u8>>, links: Vec<String>) -> Result<Self> {
        let set = Self {
            free_text: free_text.filter(|t| !t.is_empty()),
            images,
            links,
        };
        set.validate()?;
        Ok(set)
    }

    /// Start building an attachment set incrementally.
    pub fn builder() -> AttachmentSetBuilder {
        AttachmentSetBuilder::default()
    }

    /// Rebuild the attachments a stored quiz was generated from.
    pub fn from_quiz(quiz: &Quiz) -> Result<Self> {
        Self::new(
            quiz.user_prompt.clone(),
            quiz.user_photos.clone().unwrap_or_default(),
            quiz.user_links.clone().unwrap_or_default(),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.links.len() > MAX_LINKS {
            return Err(Error::InvalidInput(format!(
                "At most {} links may be attached, got {}",
                MAX_LINKS,
                self.links.len()
            )));
        }
        if self.free_text.is_none() && self.images.is_empty() && self.links.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment set needs free text, an image, or a link".to_string(),
            ));
        }
        Ok(())
    }

    /// Free-text prompt fragment, empty when none was given.
    pub fn free_text(&self) -> &str {
        self.free_text.as_deref().unwrap_or("")
    }

    /// Attached images in order.
    pub fn images(&self) -> &[Vec<u8>] {
        &self.images
    }

    /// Attached link strings in order.
    pub fn links(&self) -> &[String] {
        &self.links
    }
}

/// Incremental builder mirroring how a user edits attachments: links can be
/// added (up to [`MAX_LINKS`]), removed, and reordered.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSetBuilder {
    free_text: Option<String>,
    images: Vec<Vec<u8>>,
    links: Vec<String>,
}

impl AttachmentSetBuilder {
    pub fn free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    pub fn image(mut self, data: Vec<u8>) -> Self {
        self.images.push(data);
        self
    }

    pub fn images(mut self, images: Vec<Vec<u8>>) -> Self {
        self.images.extend(images);
        self
    }

    /// Append a link. Fails once [`MAX_LINKS`] links are present.
    pub fn push_link(&mut self, link: impl Into<String>) -> Result<()> {
        if self.links.len() >= MAX_LINKS {
            return Err(Error::InvalidInput(format!(
                "At most {} links may be attached",
                MAX_LINKS
            )));
        }
        self.links.push(link.into());
        Ok(())
    }

    /// Remove the link at `index`, returning it.
    pub fn remove_link(&mut self, index: usize) -> Option<String> {
        (index < self.links.len()).then(|| self.links.remove(index))
    }

    /// Move a link from one position to another.
    pub fn move_link(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.links.len() || to >= self.links.len() {
            return Err(Error::InvalidInput(format!(
                "Link index out of range: {} -> {} (len {})",
                from,
                to,
                self.links.len()
            )));
        }
        let link = self.links.remove(from);
        self.links.insert(to, link);
        Ok(())
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn build(self) -> Result<AttachmentSet> {
        AttachmentSet::new(self.free_text, self.images, self.links)
    }
}

/// Kind of content a link resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    YouTube,
    Pdf,
    WebPage,
    Invalid,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::YouTube => "youtube",
            LinkKind::Pdf => "pdf",
            LinkKind::WebPage => "web_page",
            LinkKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message plus images, ready for the AI client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub message: String,
    pub images: Vec<Vec<u8>>,
}

impl OutboundRequest {
    /// Join free text and resolved link texts with the attached-content separator.
    pub fn compose<S: AsRef<str>>(free_text: &str, resolved: &[S], images: Vec<Vec<u8>>) -> Self {
        let content_len: usize = resolved.iter().map(|s| s.as_ref().len()).sum();
        let mut message =
            String::with_capacity(free_text.len() + ATTACHED_CONTENT_SEPARATOR.len() + content_len);
        message.push_str(free_text);
        message.push_str(ATTACHED_CONTENT_SEPARATOR);
        for text in resolved {
            message.push_str(text.as_ref());
        }
        Self { message, images }
    }
}

// =============================================================================
// QUIZ
// =============================================================================

/// One multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub correct: bool,
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    /// `"multiple_choice"` or any other string for free-form questions.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
    /// Expected answer for free-form questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Question {
    pub fn is_multiple_choice(&self) -> bool {
        self.kind == MULTIPLE_CHOICE
    }

    /// Options flagged correct. More than one may be flagged.
    pub fn correct_options(&self) -> impl Iterator<Item = &QuizOption> {
        self.options.iter().flatten().filter(|o| o.correct)
    }
}

/// The user's response to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question: Question,
    #[serde(rename = "userAnswer")]
    pub user_answer: Vec<String>,
    #[serde(
        rename = "correctAnswer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<String>,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

/// A generated quiz, as decoded from the model and stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "quiz_title")]
    pub title: String,
    pub questions: Vec<Question>,
    #[serde(rename = "userPrompt", default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(rename = "userLinks", default, skip_serializing_if = "Option::is_none")]
    pub user_links: Option<Vec<String>>,
    #[serde(
        rename = "userPhotos",
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_photos"
    )]
    pub user_photos: Option<Vec<Vec<u8>>>,
    #[serde(rename = "userAnswers", default, skip_serializing_if = "Option::is_none")]
    pub user_answers: Option<Vec<UserAnswer>>,
}

impl Quiz {
    /// Record the attachments this quiz was generated from.
    pub fn with_attachments(mut self, attachments: &AttachmentSet) -> Self {
        self.user_prompt = Some(attachments.free_text().to_string());
        self.user_links = Some(attachments.links().to_vec());
        self.user_photos = Some(attachments.images().to_vec());
        self
    }

    /// Drop any recorded answers, returning the quiz to the unanswered state.
    pub fn clear_answers(&mut self) {
        self.user_answers = None;
    }

    pub fn is_answered(&self) -> bool {
        self.user_answers.is_some()
    }

    /// Score of the recorded answers, if the quiz was answered.
    pub fn score(&self) -> Option<Score> {
        self.user_answers.as_ref().map(|answers| Score {
            correct: answers.iter().filter(|a| a.is_correct).count(),
            total: self.questions.len(),
        })
    }
}

/// Correct answers out of the quiz's question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Whole-number percentage, rounded to nearest. Zero when there are no questions.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.correct, self.total, self.percent())
    }
}

/// Replace the model's code fence placeholder with a real markdown fence.
pub fn render_markdown(text: &str) -> String {
    text.replace(CODE_FENCE_PLACEHOLDER, CODE_FENCE)
}

// =============================================================================
// DECODE OUTCOME
// =============================================================================

/// Why a model response could not be turned into a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCategory {
    RateLimited,
    RegionRestricted,
    InvalidApiKey,
    ModelOverloaded,
    MalformedResponse,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::RateLimited => "rate_limited",
            ErrorCategory::RegionRestricted => "region_restricted",
            ErrorCategory::InvalidApiKey => "invalid_api_key",
            ErrorCategory::ModelOverloaded => "model_overloaded",
            ErrorCategory::MalformedResponse => "malformed_response",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// Message shown to the user for this category.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::RateLimited => {
                "Rate limit exceeded. Please try again later or shorten the prompt.\n\n(If you're using a free API key, Google unfortunately imposes heavy rate limits)."
            }
            ErrorCategory::RegionRestricted => {
                "Gemini API free tier is not available in your country. Please enable billing on your project in Google AI Studio."
            }
            ErrorCategory::InvalidApiKey => "API key not valid. Please pass a valid API key.",
            ErrorCategory::ModelOverloaded => "The model is overloaded. Please try again later.",
            ErrorCategory::MalformedResponse | ErrorCategory::Unknown => {
                "Unknown error has occured! Please try a different prompt."
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rate_limited" => Ok(ErrorCategory::RateLimited),
            "region_restricted" => Ok(ErrorCategory::RegionRestricted),
            "invalid_api_key" => Ok(ErrorCategory::InvalidApiKey),
            "model_overloaded" => Ok(ErrorCategory::ModelOverloaded),
            "malformed_response" => Ok(ErrorCategory::MalformedResponse),
            "unknown" => Ok(ErrorCategory::Unknown),
            other => Err(Error::InvalidInput(format!(
                "Unknown error category: {}",
                other
            ))),
        }
    }
}

/// Result of interpreting a raw model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Success(Quiz),
    Failure(ErrorCategory),
}

impl DecodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success(_))
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        match self {
            DecodeOutcome::Success(quiz) => Some(quiz),
            DecodeOutcome::Failure(_) => None,
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            DecodeOutcome::Success(_) => None,
            DecodeOutcome::Failure(category) => Some(*category),
        }
    }
}

/// One entry of the error classification table: a vendor phrase and the
/// category it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPhrase {
    pub pattern: String,
    pub category: ErrorCategory,
}

impl ErrorPhrase {
    pub fn new(pattern: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            pattern: pattern.into(),
            category,
        }
    }
}

/// Serde helper storing photos as base64 strings.
mod base64_photos {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(photos: &Option<Vec<Vec<u8>>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match photos {
            Some(photos) => serializer.collect_seq(
                photos
                    .iter()
                    .map(|p| base64::engine::general_purpose::STANDARD.encode(p)),
            ),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<u8>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<Vec<String>> = Option::deserialize(deserializer)?;
        encoded
            .map(|items| {
                items
                    .iter()
                    .map(|s| {
                        base64::engine::general_purpose::STANDARD
                            .decode(s)
                            .map_err(serde::de::Error::custom)
                    })
                    .collect()
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            text: "What is 2 + 2?".to_string(),
            kind: MULTIPLE_CHOICE.to_string(),
            options: Some(vec![
                QuizOption {
                    text: "3".to_string(),
                    correct: false,
                },
                QuizOption {
                    text: "4".to_string(),
                    correct: true,
                },
            ]),
            answer: None,
        }
    }

    fn sample_quiz() -> Quiz {
        Quiz {
            title: "Arithmetic".to_string(),
            questions: vec![sample_question()],
            user_prompt: None,
            user_links: None,
            user_photos: None,
            user_answers: None,
        }
    }

    #[test]
    fn test_attachment_set_rejects_empty() {
        let err = AttachmentSet::new(None, vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = AttachmentSet::new(Some(String::new()), vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_attachment_set_rejects_six_links() {
        let links = (0..6).map(|i| format!("https://example.com/{}", i)).collect();
        let err = AttachmentSet::new(Some("q".to_string()), vec![], links).unwrap_err();
        assert!(err.to_string().contains("At most 5 links"));
    }

    #[test]
    fn test_attachment_set_accepts_image_only() {
        let set = AttachmentSet::new(None, vec![vec![1, 2, 3]], vec![]).unwrap();
        assert_eq!(set.free_text(), "");
        assert_eq!(set.images().len(), 1);
    }

    #[test]
    fn test_builder_caps_links() {
        let mut builder = AttachmentSet::builder().free_text("quiz me");
        for i in 0..MAX_LINKS {
            builder.push_link(format!("https://example.com/{}", i)).unwrap();
        }
        assert!(builder.push_link("https://example.com/extra").is_err());
        assert_eq!(builder.links().len(), MAX_LINKS);
    }

    #[test]
    fn test_builder_reorders_and_removes_links() {
        let mut builder = AttachmentSet::builder();
        builder.push_link("https://a.example").unwrap();
        builder.push_link("https://b.example").unwrap();
        builder.push_link("https://c.example").unwrap();

        builder.move_link(2, 0).unwrap();
        assert_eq!(
            builder.links(),
            ["https://c.example", "https://a.example", "https://b.example"]
        );

        assert_eq!(builder.remove_link(1).as_deref(), Some("https://a.example"));
        assert_eq!(builder.remove_link(9), None);
        assert!(builder.move_link(0, 5).is_err());

        let set = builder.build().unwrap();
        assert_eq!(set.links(), ["https://c.example", "https://b.example"]);
    }

    #[test]
    fn test_compose_uses_separator() {
        let request = OutboundRequest::compose("Quiz me.", &["A", "B"], vec![]);
        assert_eq!(request.message, "Quiz me.Attached Website Content:AB");
    }

    #[test]
    fn test_quiz_json_field_names() {
        let json = serde_json::to_value(sample_quiz()).unwrap();
        assert_eq!(json["quiz_title"], "Arithmetic");
        assert_eq!(json["questions"][0]["question"], "What is 2 + 2?");
        assert_eq!(json["questions"][0]["type"], "multiple_choice");
        assert_eq!(json["questions"][0]["options"][1]["correct"], true);
        assert!(json.get("userAnswers").is_none());
        assert!(json.get("userPhotos").is_none());
    }

    #[test]
    fn test_user_photos_are_base64() {
        let mut quiz = sample_quiz();
        quiz.user_photos = Some(vec![b"hello".to_vec()]);

        let json = serde_json::to_value(&quiz).unwrap();
        assert_eq!(json["userPhotos"][0], "aGVsbG8=");

        let back: Quiz = serde_json::from_value(json).unwrap();
        assert_eq!(back.user_photos, Some(vec![b"hello".to_vec()]));
    }

    #[test]
    fn test_user_answer_field_names() {
        let answer = UserAnswer {
            question: sample_question(),
            user_answer: vec!["4".to_string()],
            correct_answer: None,
            is_correct: true,
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["userAnswer"][0], "4");
        assert_eq!(json["isCorrect"], true);
        assert!(json.get("correctAnswer").is_none());
    }

    #[test]
    fn test_lenient_multiple_correct_options() {
        let mut question = sample_question();
        if let Some(options) = question.options.as_mut() {
            options[0].correct = true;
        }
        assert_eq!(question.correct_options().count(), 2);
        assert!(question.is_multiple_choice());
    }

    #[test]
    fn test_score() {
        let mut quiz = sample_quiz();
        quiz.questions.push(Question {
            text: "Name a prime".to_string(),
            kind: "free_answer".to_string(),
            options: None,
            answer: Some("2".to_string()),
        });
        assert!(quiz.score().is_none());

        quiz.user_answers = Some(vec![UserAnswer {
            question: sample_question(),
            user_answer: vec!["4".to_string()],
            correct_answer: None,
            is_correct: true,
        }]);
        let score = quiz.score().unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.total, 2);
        assert_eq!(score.percent(), 50);
        assert_eq!(score.to_string(), "1/2 (50%)");
    }

    #[test]
    fn test_score_without_questions() {
        let score = Score {
            correct: 0,
            total: 0,
        };
        assert_eq!(score.percent(), 0);
    }

    #[test]
    fn test_with_attachments_and_from_quiz() {
        let set = AttachmentSet::new(
            Some("Quiz me on rust".to_string()),
            vec![vec![9, 9]],
            vec!["https://www.rust-lang.org".to_string()],
        )
        .unwrap();
        let quiz = sample_quiz().with_attachments(&set);
        assert_eq!(quiz.user_prompt.as_deref(), Some("Quiz me on rust"));

        let rebuilt = AttachmentSet::from_quiz(&quiz).unwrap();
        assert_eq!(rebuilt, set);
    }

    #[test]
    fn test_render_markdown() {
        assert_eq!(
            render_markdown("<`>rust\nfn main() {}\n<`>"),
            "```rust\nfn main() {}\n```"
        );
    }

    #[test]
    fn test_error_category_messages() {
        assert_eq!(
            ErrorCategory::MalformedResponse.user_message(),
            ErrorCategory::Unknown.user_message()
        );
        assert!(ErrorCategory::InvalidApiKey
            .user_message()
            .contains("API key not valid"));
        assert_eq!(ErrorCategory::RateLimited.to_string(), "rate_limited");
    }

    #[test]
    fn test_error_category_from_str() {
        assert_eq!(
            "model_overloaded".parse::<ErrorCategory>().unwrap(),
            ErrorCategory::ModelOverloaded
        );
        assert_eq!(
            ErrorCategory::RegionRestricted
                .as_str()
                .parse::<ErrorCategory>()
                .unwrap(),
            ErrorCategory::RegionRestricted
        );
        assert!("teapot".parse::<ErrorCategory>().is_err());
    }

    #[test]
    fn test_decode_outcome_accessors() {
        let ok = DecodeOutcome::Success(sample_quiz());
        assert!(ok.is_success());
        assert!(ok.category().is_none());

        let failed = DecodeOutcome::Failure(ErrorCategory::ModelOverloaded);
        assert!(failed.quiz().is_none());
        assert_eq!(failed.category(), Some(ErrorCategory::ModelOverloaded));
    }
}
