//! Gemini inference backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use recap_core::defaults::{ENV_GEMINI_BASE_URL, GEMINI_TIMEOUT_SECS, GEMINI_URL};
use recap_core::{
    detect_image_mime, language_name, AiRequest, Error, Preferences, QuizBackend, Result,
};

use super::error::{to_recap_error, GeminiErrorCode};
use super::streaming::{collect_text, parse_sse_stream, TextStream};
use super::types::*;
use crate::prompt::{quiz_response_schema, system_instruction};

/// Harm categories covered by the safety toggle.
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Threshold used when content filtering is enabled.
pub const THRESHOLD_FILTERED: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Threshold used when content filtering is disabled.
pub const THRESHOLD_UNFILTERED: &str = "BLOCK_NONE";

/// Header carrying the API key. The key never appears in request URLs.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key, sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model to use for generation.
    pub model: String,
    /// Questions requested per quiz.
    pub number_of_questions: u32,
    /// Display name of the quiz language (e.g. "English").
    pub language: String,
    /// Whether content filtering is enabled.
    pub safety_settings: bool,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_URL.to_string(),
            api_key: String::new(),
            model: recap_core::defaults::GEN_MODEL.to_string(),
            number_of_questions: recap_core::defaults::NUMBER_OF_QUESTIONS,
            language: "English".to_string(),
            safety_settings: false,
            timeout_seconds: GEMINI_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Build a configuration from user preferences.
    ///
    /// The base URL can be overridden with `RECAP_GEMINI_BASE_URL`.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            base_url: std::env::var(ENV_GEMINI_BASE_URL)
                .ok()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| GEMINI_URL.to_string()),
            api_key: prefs.api_key().to_string(),
            model: prefs.model().to_string(),
            number_of_questions: prefs.number_of_questions(),
            language: language_name(prefs.language())
                .unwrap_or("English")
                .to_string(),
            safety_settings: prefs.safety_settings(),
            timeout_seconds: GEMINI_TIMEOUT_SECS,
        }
    }

    /// Safety settings for every harm category.
    pub fn safety_settings(&self) -> Vec<SafetySetting> {
        let threshold = if self.safety_settings {
            THRESHOLD_FILTERED
        } else {
            THRESHOLD_UNFILTERED
        };
        HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: threshold.to_string(),
            })
            .collect()
    }
}

/// Google Gemini backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Gemini backend: url={}, model={}, questions={}, language={}",
            config.base_url, config.model, config.number_of_questions, config.language
        );

        Ok(Self { client, config })
    }

    /// Create from user preferences.
    pub fn from_preferences(prefs: &Preferences) -> Result<Self> {
        Self::new(GeminiConfig::from_preferences(prefs))
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Build the request body for an [`AiRequest`].
    pub fn build_body(&self, request: &AiRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::text(request.message.clone())];
        for image in &request.images {
            let encoded = base64::engine::general_purpose::STANDARD.encode(image);
            parts.push(Part::inline_data(detect_image_mime(image), encoded));
        }

        let generation_config = request.structured_output.then(|| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(quiz_response_schema()),
        });

        GenerateContentRequest {
            contents: vec![Content::with_role("user", parts)],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(system_instruction(
                    self.config.number_of_questions,
                    &self.config.language,
                ))],
            }),
            generation_config,
            safety_settings: self.config.safety_settings(),
        }
    }

    /// POST a request to `models/{model}:{method}`.
    async fn post(
        &self,
        method: &str,
        query: &[(&str, &str)],
        body: &GenerateContentRequest,
    ) -> Result<Response> {
        let url = format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        );

        let response = self
            .client
            .post(&url)
            .query(query)
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let (message, vendor_status) = match serde_json::from_str::<GeminiErrorResponse>(&text)
            {
                Ok(body) => (body.error.message, body.error.status.unwrap_or_default()),
                Err(_) if !text.trim().is_empty() => (text.trim().to_string(), String::new()),
                Err(_) => ("Unknown error".to_string(), String::new()),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &vendor_status);
            warn!(
                subsystem = "inference",
                model = %self.config.model,
                status = status.as_u16(),
                code = code.as_str(),
                "Gemini request failed"
            );
            return Err(to_recap_error(status, &message));
        }

        Ok(response)
    }

    /// Generate content in one response.
    async fn generate(&self, body: &GenerateContentRequest) -> Result<String> {
        let response = self.post("generateContent", &[], body).await?;
        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                Error::Inference(format!("Failed to parse response: {}", e.without_url()))
            })?;

        if let Some(reason) = result.block_reason() {
            return Err(Error::Inference(format!(
                "Gemini blocked the prompt: {}",
                reason
            )));
        }
        Ok(result.text())
    }

    /// Stream generated text chunks as they arrive.
    pub async fn stream_message(&self, request: &AiRequest) -> Result<TextStream> {
        let body = self.build_body(request);
        let response = self
            .post("streamGenerateContent", &[("alt", "sse")], &body)
            .await?;
        Ok(parse_sse_stream(response.bytes_stream()))
    }
}

#[async_trait]
impl QuizBackend for GeminiBackend {
    async fn send_message(&self, request: &AiRequest) -> Result<String> {
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            op = "send_message",
            model = %self.config.model,
            streaming = request.streaming,
            prompt_len = request.message.len(),
            image_count = request.images.len(),
            "Sending message"
        );

        let text = if request.streaming {
            collect_text(self.stream_message(request).await?).await?
        } else {
            self.generate(&self.build_body(request)).await?
        };

        info!(
            subsystem = "inference",
            op = "send_message",
            model = %self.config.model,
            streaming = request.streaming,
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::OutboundRequest;

    fn backend(safety: bool) -> GeminiBackend {
        GeminiBackend::new(GeminiConfig {
            api_key: "test-key".to_string(),
            safety_settings: safety,
            number_of_questions: 3,
            language: "German".to_string(),
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_safety_settings_enabled() {
        let settings = backend(true).config().safety_settings();
        assert_eq!(settings.len(), 4);
        assert!(settings.iter().all(|s| s.threshold == THRESHOLD_FILTERED));
    }

    #[test]
    fn test_safety_settings_disabled() {
        let settings = backend(false).config().safety_settings();
        assert!(settings.iter().all(|s| s.threshold == THRESHOLD_UNFILTERED));
        assert_eq!(
            settings.iter().map(|s| s.category.as_str()).collect::<Vec<_>>(),
            HARM_CATEGORIES
        );
    }

    #[test]
    fn test_build_body_structured_with_image() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let request = AiRequest::quiz(OutboundRequest {
            message: "Quiz me".to_string(),
            images: vec![png],
        });

        let body = serde_json::to_value(backend(false).build_body(&request)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Quiz me");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["generationConfig"]["responseSchema"].is_object());

        let instruction = body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(instruction.contains("exactly 3 questions"));
        assert!(instruction.contains("German"));
    }

    #[test]
    fn test_build_body_unstructured() {
        let request = AiRequest {
            message: "hi".to_string(),
            images: vec![],
            streaming: true,
            structured_output: false,
        };
        let body = serde_json::to_value(backend(false).build_body(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_config_from_preferences() {
        let mut prefs = Preferences::default();
        prefs.set_language("es").unwrap();
        prefs.set_number_of_questions(8).unwrap();
        prefs.set_api_key("k").unwrap();

        let config = GeminiConfig::from_preferences(&prefs);
        assert_eq!(config.language, "Spanish");
        assert_eq!(config.number_of_questions, 8);
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, "gemini-2.5-pro");
    }
}
