//! Model reply to [`TranslationBatch`] adapter

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use super::SourceError;
use crate::tree::{
    LocaleTree,
    TranslationBatch,
};

/// Key holding the per-locale map in a [`ResponseShape::Wrapped`] reply.
const TRANSLATIONS_KEY: &str = "translations";

/// Layout of the JSON object the model answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseShape {
    /// `{"en": {...}, "es": {...}}`
    #[default]
    Flat,
    /// `{"original": {...}, "translations": {"en": {...}, "es": {...}}}`; `original` is ignored.
    Wrapped,
}

/// Extracts the JSON object from a model reply.
///
/// Accepts a bare object, the first fenced code block (with or without a
/// language tag), or failing that the outermost `{ ... }` span of the text.
#[must_use]
pub fn extract_json_block(reply: &str) -> &str {
    let trimmed = reply.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    if let Some((_, rest)) = trimmed.split_once("```") {
        let (first_line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        let body = if first_line.trim_start().starts_with('{') { rest } else { remainder };
        return body.split_once("```").map_or(body, |(inner, _)| inner).trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed.get(start..=end).unwrap_or(trimmed),
        _ => trimmed,
    }
}

/// Parses a model reply into a batch for the given `locales`.
///
/// Locales missing from `locales` and locales with no strings are dropped.
///
/// # Errors
/// The reply holds no JSON object, the shape does not match, or a locale's
/// value is not an object.
pub fn parse_response(
    reply: &str,
    shape: ResponseShape,
    locales: &[String],
) -> Result<TranslationBatch, SourceError> {
    let json_text = extract_json_block(reply);
    let root: Map<String, Value> = serde_json::from_str(json_text).map_err(|e| {
        SourceError::MalformedResponse(format!("reply is not a JSON object: {e}"))
    })?;

    let by_locale = match shape {
        ResponseShape::Flat => root,
        ResponseShape::Wrapped => unwrap_translations(root)?,
    };

    let mut batch = TranslationBatch::new();
    for (locale, value) in by_locale {
        if !locales.contains(&locale) {
            tracing::warn!(locale = %locale, "Dropping locale that was not requested");
            continue;
        }
        let tree = LocaleTree::from_json(value).map_err(|e| {
            SourceError::MalformedResponse(format!("locale '{locale}' is not an object: {e}"))
        })?;
        if tree.is_empty() {
            tracing::warn!(locale = %locale, "Model returned no strings for locale");
            continue;
        }
        batch.insert(locale, tree);
    }

    Ok(batch)
}

fn unwrap_translations(mut root: Map<String, Value>) -> Result<Map<String, Value>, SourceError> {
    match root.remove(TRANSLATIONS_KEY) {
        Some(Value::Object(translations)) => Ok(translations),
        Some(_) => Err(SourceError::MalformedResponse(format!(
            "'{TRANSLATIONS_KEY}' is not an object"
        ))),
        None => Err(SourceError::MalformedResponse(format!(
            "wrapped reply has no '{TRANSLATIONS_KEY}' key"
        ))),
    }
}
