//! Prompt text sent to the chat model

use std::fmt::Write as _;

use super::{
    ResponseShape,
    TranslationRequest,
};

/// Builds the user prompt for `request`, asking for a reply in `shape`.
#[must_use]
pub fn build_prompt(request: &TranslationRequest, shape: ResponseShape) -> String {
    let document = request.document.to_string();
    let targets = request.target_locales().collect::<Vec<_>>().join(", ");
    let source = &request.source_locale;

    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert in multiple languages. Your task is to translate the values of a \
         JSON object provided by the user, never its keys.\n\n",
    );
    prompt.push_str("Instructions:\n");
    prompt.push_str("- Translate only the values, not the keys.\n");
    prompt.push_str("- Retain keys even if they are acronyms or not real words.\n");
    prompt.push_str("- Keep the nesting of the object exactly as given.\n");
    let _ = writeln!(prompt, "- Translate into these locales: {targets}.");
    let _ = writeln!(prompt, "- The text is written in '{source}'; do not translate it into '{source}'.");
    prompt.push_str("- Reply with a single JSON object and nothing else.\n\n");
    let _ = writeln!(prompt, "JSON to translate: {document}\n");
    prompt.push_str("Example format for the response:\n\n```json\n");

    let mut example = format!("\"{source}\": {document}");
    for target in request.target_locales() {
        let _ = write!(example, ",\n  \"{target}\": {{}}");
    }
    match shape {
        ResponseShape::Flat => {
            let _ = writeln!(prompt, "{{\n  {example}\n}}");
        }
        ResponseShape::Wrapped => {
            let _ = writeln!(
                prompt,
                "{{\n  \"original\": {document},\n  \"translations\": {{\n  {example}\n  }}\n}}"
            );
        }
    }
    prompt.push_str("```\n");

    prompt
}
