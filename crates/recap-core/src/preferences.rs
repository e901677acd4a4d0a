//! User preferences.
//!
//! Preferences are an explicit value passed by reference to whatever needs
//! them. They are loaded once at start from a TOML file (with `RECAP_*`
//! environment overrides) and every setter writes the file back immediately.
//!
//! ```rust,no_run
//! use recap_core::preferences::Preferences;
//!
//! let mut prefs = Preferences::load_default().expect("Failed to load preferences");
//! prefs.set_number_of_questions(10).expect("Failed to save");
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::defaults::{
    APP_DIR, ENV_API_KEY, ENV_LANGUAGE, ENV_MODEL, ENV_NUMBER_OF_QUESTIONS, ENV_SAFETY_SETTINGS,
    GEN_MODEL, LANGUAGE, NUMBER_OF_QUESTIONS, PREFERENCES_FILE, SUPPORTED_LANGUAGES,
    SUPPORTED_MODELS,
};
use crate::error::{Error, Result};
use crate::models::ErrorPhrase;

/// Persisted preference values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceValues {
    /// Gemini API key. Empty until the user enters one.
    pub api_key: String,
    /// Generation model name.
    pub model: String,
    /// Questions requested per quiz (at least 1).
    pub number_of_questions: u32,
    /// Quiz language code.
    pub language: String,
    /// Whether Gemini content filtering is enabled.
    pub safety_settings: bool,
    /// Extra vendor phrases appended to the error classification table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_phrases: Vec<ErrorPhrase>,
}

impl Default for PreferenceValues {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: GEN_MODEL.to_string(),
            number_of_questions: NUMBER_OF_QUESTIONS,
            language: LANGUAGE.to_string(),
            safety_settings: false,
            error_phrases: Vec::new(),
        }
    }
}

/// Preferences bound to the file they persist to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: PreferenceValues,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::in_memory(PreferenceValues::default())
    }
}

impl Preferences {
    /// Preferences that are never written to disk.
    pub fn in_memory(values: PreferenceValues) -> Self {
        Self { path: None, values }
    }

    /// Get the default preferences file path.
    ///
    /// Returns: <config_dir>/recap/preferences.toml
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push(APP_DIR);
        path.push(PREFERENCES_FILE);
        path
    }

    /// Load from the default path with environment overrides applied.
    pub fn load_default() -> Result<Self> {
        let mut prefs = Self::load(Self::default_path())?;
        prefs.apply_env();
        Ok(prefs)
    }

    /// Load from `path`. A missing file yields defaults bound to that path.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut values = if path.exists() {
            info!("Loading preferences from: {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<PreferenceValues>(&content)?
        } else {
            debug!(
                "Preferences file not found at {}, using defaults",
                path.display()
            );
            PreferenceValues::default()
        };

        // A stored zero is treated as unset.
        if values.number_of_questions == 0 {
            values.number_of_questions = NUMBER_OF_QUESTIONS;
        }

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Apply `RECAP_*` environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var(ENV_API_KEY) {
            self.values.api_key = key;
        }
        if let Ok(model) = env::var(ENV_MODEL) {
            if !model.is_empty() {
                self.values.model = model;
            }
        }
        if let Some(count) = env::var(ENV_NUMBER_OF_QUESTIONS)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            self.values.number_of_questions = count.max(1);
        }
        if let Ok(language) = env::var(ENV_LANGUAGE) {
            if language_name(&language).is_some() {
                self.values.language = language;
            }
        }
        if let Ok(flag) = env::var(ENV_SAFETY_SETTINGS) {
            self.values.safety_settings = flag == "1" || flag.to_lowercase() == "true";
        }
    }

    /// Write the current values to the bound file, if any.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        write_toml(path, &self.values)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn values(&self) -> &PreferenceValues {
        &self.values
    }

    pub fn api_key(&self) -> &str {
        &self.values.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.values.api_key.trim().is_empty()
    }

    pub fn model(&self) -> &str {
        &self.values.model
    }

    pub fn number_of_questions(&self) -> u32 {
        self.values.number_of_questions
    }

    pub fn language(&self) -> &str {
        &self.values.language
    }

    pub fn safety_settings(&self) -> bool {
        self.values.safety_settings
    }

    pub fn error_phrases(&self) -> &[ErrorPhrase] {
        &self.values.error_phrases
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<()> {
        let api_key = api_key.into().trim().to_string();
        self.update(|values| values.api_key = api_key)
    }

    /// Set the generation model. Models outside [`SUPPORTED_MODELS`] are
    /// accepted with a warning.
    pub fn set_model(&mut self, model: impl Into<String>) -> Result<()> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::InvalidInput("Model name cannot be empty".to_string()));
        }
        if !SUPPORTED_MODELS.contains(&model.as_str()) {
            warn!(
                model = %model,
                offered = ?SUPPORTED_MODELS,
                "Using a model outside the offered list"
            );
        }
        self.update(|values| values.model = model)
    }

    /// Set the question count. Values below 1 are raised to 1.
    pub fn set_number_of_questions(&mut self, count: u32) -> Result<()> {
        self.update(|values| values.number_of_questions = count.max(1))
    }

    pub fn set_language(&mut self, code: impl Into<String>) -> Result<()> {
        let code = code.into();
        if language_name(&code).is_none() {
            return Err(Error::InvalidInput(format!(
                "Unsupported language code: {}",
                code
            )));
        }
        self.update(|values| values.language = code)
    }

    pub fn set_safety_settings(&mut self, enabled: bool) -> Result<()> {
        self.update(|values| values.safety_settings = enabled)
    }

    pub fn add_error_phrase(&mut self, phrase: ErrorPhrase) -> Result<()> {
        if phrase.pattern.is_empty() {
            return Err(Error::InvalidInput(
                "Error phrase pattern cannot be empty".to_string(),
            ));
        }
        self.update(|values| values.error_phrases.push(phrase))
    }

    /// Apply `change` and persist it. The in-memory values only change once
    /// the write succeeded.
    fn update(&mut self, change: impl FnOnce(&mut PreferenceValues)) -> Result<()> {
        let mut next = self.values.clone();
        change(&mut next);
        if let Some(path) = self.path.as_deref() {
            write_toml(path, &next)?;
        }
        self.values = next;
        Ok(())
    }
}

/// Display name for a supported language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

fn write_toml(path: &Path, values: &PreferenceValues) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(values)?;
    std::fs::write(path, content)?;
    debug!("Saved preferences to {}", path.display());
    Ok(())
}
