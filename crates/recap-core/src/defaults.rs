//! Centralized default constants for Recap.
//!
//! Shared magic values live here so the fetch, inference and quiz crates agree
//! on limits, literals, and vendor phrases.

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Maximum number of links in one attachment set.
pub const MAX_LINKS: usize = 5;

/// Maximum number of images kept in one attachment set.
pub const MAX_IMAGES: usize = 5;

/// Shortest string accepted as a URL (`http://a.a`).
pub const MIN_URL_LEN: usize = 10;

/// Separator placed between the free-text prompt and resolved link content.
///
/// Stored history is re-submitted with this exact literal, so it must not change.
pub const ATTACHED_CONTENT_SEPARATOR: &str = "Attached Website Content:";

/// MIME type assumed for images whose magic bytes are not recognized.
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

// =============================================================================
// QUIZ
// =============================================================================

/// Question type string for multiple choice questions.
pub const MULTIPLE_CHOICE: &str = "multiple_choice";

/// Question type string for free-form questions.
pub const FREE_ANSWER: &str = "free_answer";

/// Placeholder the model writes instead of a markdown code fence.
pub const CODE_FENCE_PLACEHOLDER: &str = "<`>";

/// Markdown code fence substituted for [`CODE_FENCE_PLACEHOLDER`].
pub const CODE_FENCE: &str = "```";

// =============================================================================
// PREFERENCES
// =============================================================================

/// Default generation model.
pub const GEN_MODEL: &str = "gemini-2.5-pro";

/// Models offered to the user.
pub const SUPPORTED_MODELS: &[&str] = &["gemini-2.5-pro", "gemini-2.5-flash"];

/// Default number of questions requested per quiz.
pub const NUMBER_OF_QUESTIONS: u32 = 5;

/// Default quiz language code.
pub const LANGUAGE: &str = "en";

/// Languages the quiz can be generated in, as (display name, code).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("Bengali", "bn"),
    ("Bulgarian", "bg"),
    ("Chinese (Simplified and Traditional)", "zh"),
    ("Croatian", "hr"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Estonian", "et"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hebrew", "iw"),
    ("Hindi", "hi"),
    ("Hungarian", "hu"),
    ("Indonesian", "id"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Latvian", "lv"),
    ("Lithuanian", "lt"),
    ("Norwegian", "no"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Russian", "ru"),
    ("Serbian", "sr"),
    ("Slovak", "sk"),
    ("Slovenian", "sl"),
    ("Spanish", "es"),
    ("Swahili", "sw"),
    ("Swedish", "sv"),
    ("Thai", "th"),
    ("Turkish", "tr"),
    ("Ukrainian", "uk"),
    ("Vietnamese", "vi"),
];

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "recap";

/// Preferences file name.
pub const PREFERENCES_FILE: &str = "preferences.toml";

/// History file name.
pub const HISTORY_FILE: &str = "history.json";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Environment variable overriding the Gemini API key.
pub const ENV_API_KEY: &str = "RECAP_API_KEY";

/// Environment variable overriding the model.
pub const ENV_MODEL: &str = "RECAP_MODEL";

/// Environment variable overriding the question count.
pub const ENV_NUMBER_OF_QUESTIONS: &str = "RECAP_NUMBER_OF_QUESTIONS";

/// Environment variable overriding the quiz language.
pub const ENV_LANGUAGE: &str = "RECAP_LANGUAGE";

/// Environment variable overriding the safety toggle.
pub const ENV_SAFETY_SETTINGS: &str = "RECAP_SAFETY_SETTINGS";

/// Environment variable overriding the Gemini base URL.
pub const ENV_GEMINI_BASE_URL: &str = "RECAP_GEMINI_BASE_URL";

// =============================================================================
// GEMINI
// =============================================================================

/// Default Gemini API endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini request timeout in seconds.
pub const GEMINI_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// FETCHING
// =============================================================================

/// Timeout for external commands such as `pdftotext`.
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

/// User agent sent by content fetchers.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; Recap/1.0)";

/// Base URL for YouTube watch pages.
pub const YOUTUBE_URL: &str = "https://www.youtube.com";

// =============================================================================
// VENDOR ERROR PHRASES
// =============================================================================

/// Substring present in rate limit failures.
pub const PHRASE_RATE_LIMITED: &str = "429";

/// Substring present when the free tier is unavailable in the caller's region.
pub const PHRASE_REGION_RESTRICTED: &str = "not available in your country";

/// Substring present when the API key is rejected.
pub const PHRASE_INVALID_API_KEY: &str = "valid API key";

/// Substring present when the model is overloaded.
pub const PHRASE_MODEL_OVERLOADED: &str = "The model is overloaded";
