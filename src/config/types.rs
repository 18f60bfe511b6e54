use std::collections::HashSet;
use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::locale::{
    check_locale,
    normalize_locale,
};
use crate::source::ResponseShape;
use crate::updater::{
    FailurePolicy,
    MergeConfiguration,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "locales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chat completion API flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Provider {
    /// `{endpoint}/openai/deployments/{deployment}/chat/completions` with an `api-key` header.
    #[default]
    Azure,
    /// `{endpoint}/chat/completions` with a bearer token; `deployment` is the model name.
    Openai,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub provider: Provider,
    /// Base URL of the API. Required only when a translation is requested.
    pub endpoint: String,
    pub deployment: String,
    /// Azure `api-version` query parameter.
    pub api_version: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Azure,
            endpoint: String::new(),
            deployment: "gpt-4o-mini".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            api_key_env: "AZURE_OPENAI_KEY".to_string(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Directory holding `<locale>.json` files.
    pub locales_directory: PathBuf,

    /// Locales requested from the model, source locale included.
    pub locales: Vec<String>,

    /// Locale the input document is written in. Its file receives the input as-is.
    pub source_locale: String,

    pub auto_sort: bool,
    pub on_error: FailurePolicy,
    pub response_shape: ResponseShape,
    pub model: ModelConfig,
}

impl Settings {
    #[must_use]
    pub const fn merge_configuration(&self) -> MergeConfiguration {
        MergeConfiguration { auto_sort: self.auto_sort, on_error: self.on_error }
    }

    /// # Errors
    /// - Required field is empty
    /// - Invalid or duplicated locale identifier
    /// - Source locale not among `locales`
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locales_directory.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "localesDirectory",
                "The directory cannot be empty. Example: \"locales\"",
            ));
        }

        if self.locales.is_empty() {
            errors.push(ValidationError::new(
                "locales",
                "At least one locale is required. Example: [\"en\", \"es\"]",
            ));
        }

        let mut seen = HashSet::new();
        for (index, locale) in self.locales.iter().enumerate() {
            if let Err(e) = check_locale(locale) {
                errors.push(ValidationError::new(format!("locales[{index}]"), e.to_string()));
            } else if !seen.insert(normalize_locale(locale)) {
                errors.push(ValidationError::new(
                    format!("locales[{index}]"),
                    format!("Duplicate locale '{locale}'"),
                ));
            }
        }

        if self.source_locale.is_empty() {
            errors.push(ValidationError::new(
                "sourceLocale",
                "The source locale cannot be empty. Example: \"en\"",
            ));
        } else if !self.locales.is_empty() && !self.locales.contains(&self.source_locale) {
            errors.push(ValidationError::new(
                "sourceLocale",
                format!("Source locale '{}' must be listed in 'locales'", self.source_locale),
            ));
        }

        if self.model.deployment.is_empty() {
            errors.push(ValidationError::new(
                "model.deployment",
                "The deployment cannot be empty. Example: \"gpt-4o-mini\"",
            ));
        }

        if self.model.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "model.apiKeyEnv",
                "The variable name cannot be empty. Example: \"AZURE_OPENAI_KEY\"",
            ));
        }

        if let Some(temperature) = self.model.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            errors.push(ValidationError::new(
                "model.temperature",
                format!("Temperature must be between 0 and 2, got {temperature}"),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locales_directory: PathBuf::from("locales"),
            locales: ["en", "es", "it", "de", "fr"].map(String::from).to_vec(),
            source_locale: "en".to_string(),
            auto_sort: true,
            on_error: FailurePolicy::Abort,
            response_shape: ResponseShape::Flat,
            model: ModelConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub locales_directory: Option<PathBuf>,
    pub locales: Option<Vec<String>>,
    pub auto_sort: Option<bool>,
    pub on_error: Option<FailurePolicy>,
    pub response_shape: Option<ResponseShape>,
}

impl SettingsOverrides {
    #[must_use]
    pub fn apply(self, settings: Settings) -> Settings {
        Settings {
            locales_directory: self.locales_directory.unwrap_or(settings.locales_directory),
            locales: self.locales.unwrap_or(settings.locales),
            auto_sort: self.auto_sort.unwrap_or(settings.auto_sort),
            on_error: self.on_error.unwrap_or(settings.on_error),
            response_shape: self.response_shape.unwrap_or(settings.response_shape),
            ..settings
        }
    }
}
