//! Chat completion API translation source

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    ResponseShape,
    SourceError,
    TranslationRequest,
    TranslationSource,
    build_prompt,
    parse_response,
};
use crate::config::{
    ModelConfig,
    Provider,
};
use crate::tree::TranslationBatch;

/// Translates by sending one chat completion request per run.
#[derive(Clone)]
pub struct ChatCompletionSource {
    client: reqwest::Client,
    model: ModelConfig,
    api_key: String,
    shape: ResponseShape,
}

impl fmt::Debug for ChatCompletionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionSource")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatCompletionSource {
    /// # Errors
    /// `model.endpoint` is empty.
    pub fn new(
        model: ModelConfig,
        api_key: impl Into<String>,
        shape: ResponseShape,
    ) -> Result<Self, SourceError> {
        if model.endpoint.trim().is_empty() {
            return Err(SourceError::MissingEndpoint);
        }
        Ok(Self { client: reqwest::Client::new(), model, api_key: api_key.into(), shape })
    }

    /// Reads the API key from the variable named by `model.api_key_env`.
    ///
    /// # Errors
    /// The variable is unset or empty, or `model.endpoint` is empty.
    pub fn from_env(model: ModelConfig, shape: ResponseShape) -> Result<Self, SourceError> {
        let api_key = std::env::var(&model.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SourceError::MissingApiKey(model.api_key_env.clone()))?;
        Self::new(model, api_key, shape)
    }

    fn request_url(&self) -> String {
        let endpoint = self.model.endpoint.trim_end_matches('/');
        match self.model.provider {
            Provider::Azure => format!(
                "{endpoint}/openai/deployments/{}/chat/completions?api-version={}",
                self.model.deployment, self.model.api_version
            ),
            Provider::Openai => format!("{endpoint}/chat/completions"),
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        let model = match self.model.provider {
            Provider::Azure => None,
            Provider::Openai => Some(self.model.deployment.as_str()),
        };
        ChatRequest {
            model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.model.temperature,
        }
    }

    fn completion_content(response: ChatResponse) -> Result<String, SourceError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SourceError::EmptyCompletion)
    }

    async fn complete(&self, prompt: &str) -> Result<String, SourceError> {
        let url = self.request_url();
        tracing::debug!(url = %url, "Sending chat completion request");

        let builder = self.client.post(&url).json(&self.request_body(prompt));
        let builder = match self.model.provider {
            Provider::Azure => builder.header("api-key", &self.api_key),
            Provider::Openai => builder.bearer_auth(&self.api_key),
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        Self::completion_content(response.json().await?)
    }
}

impl TranslationSource for ChatCompletionSource {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationBatch, SourceError> {
        let prompt = build_prompt(request, self.shape);
        let reply = self.complete(&prompt).await?;
        tracing::debug!(chars = reply.len(), "Received chat completion");
        parse_response(&reply, self.shape, &request.locales)
    }
}
