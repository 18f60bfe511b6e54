//! Replays a saved model reply from disk

use std::path::PathBuf;

use super::{
    ResponseShape,
    SourceError,
    TranslationRequest,
    TranslationSource,
    parse_response,
};
use crate::tree::TranslationBatch;

/// Reads an already translated reply instead of calling a model.
///
/// The file goes through the same adapter as a live reply, so it may be a
/// bare JSON object or a fenced block copied from a chat transcript.
#[derive(Debug, Clone)]
pub struct BatchFileSource {
    path: PathBuf,
    shape: ResponseShape,
}

impl BatchFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, shape: ResponseShape) -> Self {
        Self { path: path.into(), shape }
    }
}

impl TranslationSource for BatchFileSource {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationBatch, SourceError> {
        tracing::debug!(path = %self.path.display(), "Reading translation batch");
        let reply = tokio::fs::read_to_string(&self.path).await?;
        parse_response(&reply, self.shape, &request.locales)
    }
}
