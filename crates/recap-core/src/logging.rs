//! Structured logging field name constants for Recap.
//!
//! Events across the fetch, inference and quiz subsystems use these names
//! for their structured `tracing` fields so log queries work across crates.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and the user sees an error |
//! | WARN  | Recoverable issue, fallback applied (e.g. empty link text) |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "fetch", "inference", "quiz", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "aggregate", "resolve_link", "send_message", "decode"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Link URL being resolved.
pub const LINK: &str = "link";

/// Classified link kind.
pub const LINK_KIND: &str = "link_kind";

/// Position of a link in the attachment set.
pub const LINK_INDEX: &str = "link_index";

/// YouTube video identifier.
pub const VIDEO_ID: &str = "video_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of links in a batch.
pub const LINK_COUNT: &str = "link_count";

/// Number of images in a request.
pub const IMAGE_COUNT: &str = "image_count";

/// Number of questions in a quiz.
pub const QUESTION_COUNT: &str = "question_count";

/// Byte length of a prompt or message.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether the streaming endpoint was used.
pub const STREAMING: &str = "streaming";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Decode failure category.
pub const CATEGORY: &str = "category";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
