//! Gemini-specific error handling.

use recap_core::Error;

/// Gemini error codes, from HTTP status and the vendor `status` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Malformed request or invalid API key.
    InvalidArgument,
    /// Free tier unavailable in the caller's region, or billing required.
    FailedPrecondition,
    /// Key lacks permission for the model.
    PermissionDenied,
    /// Model name unknown.
    NotFound,
    /// Quota or rate limit exceeded.
    ResourceExhausted,
    /// Model temporarily overloaded.
    Unavailable,
    /// Server error.
    Internal,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and vendor status string.
    pub fn from_response(status: u16, vendor_status: &str) -> Self {
        match (status, vendor_status) {
            (_, "FAILED_PRECONDITION") => Self::FailedPrecondition,
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::ResourceExhausted,
            (400, _) | (_, "INVALID_ARGUMENT") => Self::InvalidArgument,
            (403, _) | (_, "PERMISSION_DENIED") => Self::PermissionDenied,
            (404, _) | (_, "NOT_FOUND") => Self::NotFound,
            (503, _) | (_, "UNAVAILABLE") => Self::Unavailable,
            (500..=599, _) => Self::Internal,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::FailedPrecondition => "failed_precondition",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
            Self::Unknown => "unknown",
        }
    }
}

/// Build the error for a non-2xx response.
///
/// The HTTP status and vendor message are kept verbatim so downstream
/// classification can match on them.
pub fn to_recap_error(status: reqwest::StatusCode, message: &str) -> Error {
    Error::Inference(format!("Gemini returned {}: {}", status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_429() {
        assert_eq!(
            GeminiErrorCode::from_response(429, "RESOURCE_EXHAUSTED"),
            GeminiErrorCode::ResourceExhausted
        );
    }

    #[test]
    fn test_error_code_region() {
        assert_eq!(
            GeminiErrorCode::from_response(400, "FAILED_PRECONDITION"),
            GeminiErrorCode::FailedPrecondition
        );
    }

    #[test]
    fn test_error_code_invalid_key() {
        assert_eq!(
            GeminiErrorCode::from_response(400, "INVALID_ARGUMENT"),
            GeminiErrorCode::InvalidArgument
        );
    }

    #[test]
    fn test_error_code_overloaded() {
        assert_eq!(
            GeminiErrorCode::from_response(503, "UNAVAILABLE"),
            GeminiErrorCode::Unavailable
        );
    }

    #[test]
    fn test_error_code_server_and_unknown() {
        assert_eq!(
            GeminiErrorCode::from_response(502, ""),
            GeminiErrorCode::Internal
        );
        assert_eq!(
            GeminiErrorCode::from_response(418, "TEAPOT"),
            GeminiErrorCode::Unknown
        );
    }

    #[test]
    fn test_to_recap_error_keeps_status_and_message() {
        let err = to_recap_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "Resource has been exhausted",
        );
        assert!(matches!(err, Error::Inference(_)));
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("Resource has been exhausted"));
    }
}
