//! Locale identifier checks

use thiserror::Error;

/// A locale identifier that cannot be used as a file name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid locale identifier '{0}': only letters, digits, '-' and '_' are allowed")]
pub struct InvalidLocale(pub String);

/// Checks that `locale` is safe to use as `<locale>.json` inside the locale directory.
///
/// Identifiers such as `en`, `pt-BR`, `zh_Hant` pass. Anything that could
/// escape the directory (`..`, separators) or is empty is rejected.
///
/// # Errors
/// The identifier is empty or contains a character outside `[A-Za-z0-9_-]`.
pub fn check_locale(locale: &str) -> Result<(), InvalidLocale> {
    let valid = !locale.is_empty()
        && locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(InvalidLocale(locale.to_string())) }
}

/// Normalize locale identifier (lowercase and replace - with _)
///
/// `pt-BR`, `pt_br` and `PT-br` all normalize to `pt_br`.
#[must_use]
pub fn normalize_locale(locale: &str) -> String {
    locale.to_lowercase().replace('-', "_")
}
