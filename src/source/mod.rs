//! Translation sources
//!
//! A source turns a JSON document of source strings into a
//! [`TranslationBatch`]. The chat completion source asks a hosted model;
//! the batch file source replays a response saved on disk.

mod batch_file;
mod chat;
mod prompt;
mod response;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::tree::TranslationBatch;

pub use batch_file::BatchFileSource;
pub use chat::ChatCompletionSource;
pub use prompt::build_prompt;
pub use response::{
    ResponseShape,
    extract_json_block,
    parse_response,
};

/// Errors raised while obtaining translations.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to translation service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation service returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Translation service returned no message content")]
    EmptyCompletion,

    #[error("Malformed translation response: {0}")]
    MalformedResponse(String),

    #[error("Environment variable '{0}' with the API key is not set")]
    MissingApiKey(String),

    #[error("Model endpoint is not configured (set 'model.endpoint')")]
    MissingEndpoint,

    #[error("Failed to read translation batch: {0}")]
    Io(#[from] std::io::Error),
}

/// What to translate and into which locales.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Every locale wanted in the response, source locale included.
    pub locales: Vec<String>,
    pub source_locale: String,
    /// JSON object whose string values get translated.
    pub document: Value,
}

impl TranslationRequest {
    /// Locales the model actually has to translate into.
    pub fn target_locales(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str).filter(|locale| *locale != self.source_locale)
    }
}

/// Produces a [`TranslationBatch`] for a request.
pub trait TranslationSource {
    /// # Errors
    /// The source is unreachable or answers with something that is not a batch.
    fn translate(
        &self,
        request: &TranslationRequest,
    ) -> impl Future<Output = Result<TranslationBatch, SourceError>> + Send;
}
