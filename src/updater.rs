//! Applies a translation batch to the locale directory

use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::store::{
    LocaleStore,
    StoreError,
};
use crate::tree::{
    LocaleTree,
    TranslationBatch,
    deep_merge,
    sort_keys_recursive,
};

/// What to do when one locale of a batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Stop at the first failing locale. Locales already written stay written.
    #[default]
    Abort,
    /// Record the failure and carry on with the remaining locales.
    Continue,
}

/// Options for a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfiguration {
    /// Sort keys at every level before writing.
    pub auto_sort: bool,
    pub on_error: FailurePolicy,
}

impl Default for MergeConfiguration {
    fn default() -> Self {
        Self { auto_sort: true, on_error: FailurePolicy::Abort }
    }
}

#[derive(Error, Debug)]
#[error("Failed to update locale '{locale}': {source}")]
pub struct UpdateError {
    pub locale: String,
    #[source]
    pub source: StoreError,
}

/// A locale that could not be updated under [`FailurePolicy::Continue`].
#[derive(Debug)]
pub struct LocaleFailure {
    pub locale: String,
    pub error: StoreError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Written files, in batch order.
    pub updated: Vec<(String, PathBuf)>,
    pub failed: Vec<LocaleFailure>,
}

impl UpdateReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Locale identifiers that were written.
    pub fn updated_locales(&self) -> impl Iterator<Item = &str> {
        self.updated.iter().map(|(locale, _)| locale.as_str())
    }

    fn record(
        &mut self,
        locale: String,
        result: Result<PathBuf, StoreError>,
        policy: FailurePolicy,
    ) -> Result<(), UpdateError> {
        match result {
            Ok(path) => {
                self.updated.push((locale, path));
                Ok(())
            }
            Err(source) if policy == FailurePolicy::Abort => Err(UpdateError { locale, source }),
            Err(error) => {
                tracing::warn!(locale = %locale, "Skipping locale: {error}");
                self.failed.push(LocaleFailure { locale, error });
                Ok(())
            }
        }
    }
}

/// Merges `fragment` into the stored file for `locale` and writes it back.
///
/// The existing file is parsed before anything is written, so a malformed
/// file is reported and left untouched.
///
/// # Errors
/// - the existing file cannot be read or parsed
/// - the result cannot be written
pub fn update_locale(
    store: &LocaleStore,
    locale: &str,
    fragment: LocaleTree,
    auto_sort: bool,
) -> Result<PathBuf, StoreError> {
    let mut tree = store.load(locale)?;
    deep_merge(&mut tree, fragment);
    if auto_sort {
        sort_keys_recursive(&mut tree);
    }
    let path = store.save(locale, &tree)?;
    tracing::info!(locale = %locale, "Updated {locale}.json");
    Ok(path)
}

/// Updates every locale present in `batch`, one after another.
///
/// # Errors
/// With [`FailurePolicy::Abort`], the first locale that fails. Under
/// [`FailurePolicy::Continue`] failures are collected in the report instead.
pub fn update_locales(
    store: &LocaleStore,
    batch: TranslationBatch,
    config: MergeConfiguration,
) -> Result<UpdateReport, UpdateError> {
    tracing::debug!(
        directory = %store.directory().display(),
        locales = batch.len(),
        auto_sort = config.auto_sort,
        "Updating locale files"
    );

    let mut report = UpdateReport::default();
    for (locale, fragment) in batch {
        let result = update_locale(store, &locale, fragment, config.auto_sort);
        report.record(locale, result, config.on_error)?;
    }
    Ok(report)
}

/// Rewrites the existing files of `locales` with keys sorted at every level.
///
/// Locales without a file are skipped.
///
/// # Errors
/// With [`FailurePolicy::Abort`], the first locale that fails.
pub fn sort_locale_files(
    store: &LocaleStore,
    locales: &[String],
    on_error: FailurePolicy,
) -> Result<UpdateReport, UpdateError> {
    let mut report = UpdateReport::default();
    for locale in locales {
        match sort_locale_file(store, locale).transpose() {
            None => tracing::debug!(locale = %locale, "No locale file to sort"),
            Some(result) => report.record(locale.clone(), result, on_error)?,
        }
    }
    Ok(report)
}

fn sort_locale_file(store: &LocaleStore, locale: &str) -> Result<Option<PathBuf>, StoreError> {
    if !store.exists(locale)? {
        return Ok(None);
    }
    let mut tree = store.load(locale)?;
    sort_keys_recursive(&mut tree);
    let path = store.save(locale, &tree)?;
    tracing::info!(locale = %locale, "Sorted {locale}.json");
    Ok(Some(path))
}
