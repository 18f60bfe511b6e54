//! Locale file persistence
//!
//! One JSON file per locale lives at `<directory>/<locale>.json`. Files are
//! read whole, and rewritten whole through a temporary file in the same
//! directory that is renamed over the target, so a failed write never
//! leaves a half-written locale file behind.

use std::fs;
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::locale::{
    InvalidLocale,
    check_locale,
};
use crate::tree::LocaleTree;

/// Indentation used for every JSON document this crate writes.
const INDENT: &[u8] = b"    ";

/// Errors raised while reading or writing locale files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The existing file is not a JSON object.
    #[error("Malformed locale file {}: {source}", path.display())]
    MalformedLocaleFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading, writing or renaming failed.
    #[error("File system error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    InvalidLocale(#[from] InvalidLocale),

    #[error("Failed to serialize locale tree: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Serializes `value` as 4-space indented JSON with non-ASCII characters kept literal.
///
/// # Errors
/// `value` fails to serialize (never the case for locale trees).
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Directory of per-locale JSON files.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    directory: PathBuf,
}

impl LocaleStore {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Resolves `<directory>/<locale>.json`.
    ///
    /// # Errors
    /// `locale` is not a plain identifier.
    pub fn path_for(&self, locale: &str) -> Result<PathBuf, StoreError> {
        check_locale(locale)?;
        Ok(self.directory.join(format!("{locale}.json")))
    }

    /// Whether a file exists for `locale`.
    ///
    /// # Errors
    /// `locale` is not a plain identifier.
    pub fn exists(&self, locale: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(locale)?.is_file())
    }

    /// Loads the tree for `locale`; a missing file is an empty tree.
    ///
    /// # Errors
    /// - the file exists but cannot be read
    /// - the content is not a JSON object
    pub fn load(&self, locale: &str) -> Result<LocaleTree, StoreError> {
        let path = self.path_for(locale)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Locale file not found, starting empty");
                return Ok(LocaleTree::new());
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        tracing::debug!(path = %path.display(), "Loading locale file");
        serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::MalformedLocaleFile { path, source })
    }

    /// Replaces the file for `locale` with `tree`.
    ///
    /// The content goes to a temporary sibling file first, which is then
    /// renamed over the target. A symlinked locale file is written through
    /// to the file it points at. Permissions of an existing file are kept.
    ///
    /// # Errors
    /// - the existing file is read-only
    /// - the directory is missing or not writable
    /// - the rename fails
    pub fn save(&self, locale: &str, tree: &LocaleTree) -> Result<PathBuf, StoreError> {
        let path = self.path_for(locale)?;
        let target = Self::resolve_target(&path)?;
        let permissions = Self::existing_permissions(&target)?;
        let bytes = to_json_bytes(tree).map_err(StoreError::Serialize)?;

        let directory = target.parent().unwrap_or(self.directory.as_path());
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{locale}."))
            .suffix(".json.tmp")
            .tempfile_in(directory)
            .map_err(|e| StoreError::io(directory, e))?;

        temp.write_all(&bytes).map_err(|e| StoreError::io(temp.path(), e))?;
        temp.as_file().sync_all().map_err(|e| StoreError::io(temp.path(), e))?;
        match permissions {
            Some(permissions) => fs::set_permissions(temp.path(), permissions)
                .map_err(|e| StoreError::io(temp.path(), e))?,
            None => Self::default_permissions(temp.path())?,
        }

        temp.persist(&target).map_err(|e| StoreError::io(&target, e.error))?;
        tracing::debug!(
            path = %path.display(),
            target = %target.display(),
            bytes = bytes.len(),
            "Wrote locale file"
        );

        Ok(path)
    }

    /// Follows a symlinked locale file to the file that receives the write.
    fn resolve_target(path: &Path) -> Result<PathBuf, StoreError> {
        match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.file_type().is_symlink() => match fs::canonicalize(path) {
                Ok(target) => Ok(target),
                // dangling link: create the file it names
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let link = fs::read_link(path).map_err(|e| StoreError::io(path, e))?;
                    Ok(match path.parent() {
                        Some(parent) => parent.join(link),
                        None => link,
                    })
                }
                Err(e) => Err(StoreError::io(path, e)),
            },
            Ok(_) => Ok(path.to_path_buf()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Permissions of the file being replaced, `None` when it does not exist yet.
    ///
    /// A read-only file is refused: the rename would replace it anyway, since
    /// only the directory has to be writable.
    fn existing_permissions(target: &Path) -> Result<Option<fs::Permissions>, StoreError> {
        match fs::metadata(target) {
            Ok(metadata) if metadata.permissions().readonly() => Err(StoreError::io(
                target,
                io::Error::new(io::ErrorKind::PermissionDenied, "locale file is read-only"),
            )),
            Ok(metadata) => Ok(Some(metadata.permissions())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(target, e)),
        }
    }

    #[cfg(unix)]
    fn default_permissions(temp: &Path) -> Result<(), StoreError> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(temp, fs::Permissions::from_mode(0o644))
            .map_err(|e| StoreError::io(temp, e))
    }

    #[cfg(not(unix))]
    fn default_permissions(_temp: &Path) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use proptest::{
        prop_assert_eq,
        proptest,
    };
    use rstest::{
        fixture,
        rstest,
    };
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        arb_locale_tree,
        keys_of,
        tree,
    };

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[rstest]
    fn load_missing_file_is_empty(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        let loaded = store.load("es").unwrap();

        assert!(loaded.is_empty());
    }

    #[rstest]
    fn load_reads_nested_tree(temp_dir: TempDir) {
        fs::write(temp_dir.path().join("de.json"), r#"{"a": {"b": "Ä"}}"#).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        let loaded = store.load("de").unwrap();

        assert_eq!(loaded, tree(json!({"a": {"b": "Ä"}})));
    }

    #[rstest]
    #[case::invalid_json("{not json")]
    #[case::empty_file("")]
    #[case::array("[1, 2]")]
    #[case::string(r#""hello""#)]
    fn load_rejects_malformed_file(temp_dir: TempDir, #[case] content: &str) {
        fs::write(temp_dir.path().join("fr.json"), content).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        let result = store.load("fr");

        assert!(matches!(result, Err(StoreError::MalformedLocaleFile { .. })), "{result:?}");
    }

    #[rstest]
    fn load_rejects_path_like_locale(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        let result = store.load("../secrets");

        assert!(matches!(result, Err(StoreError::InvalidLocale(_))));
    }

    #[rstest]
    fn save_writes_four_space_indent_and_literal_unicode(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        store.save("ja", &tree(json!({"greeting": {"hello": "こんにちは"}, "bye": "Adiós"}))).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("ja.json")).unwrap();
        assert_eq!(
            written,
            "{\n    \"greeting\": {\n        \"hello\": \"こんにちは\"\n    },\n    \"bye\": \"Adiós\"\n}"
        );
    }

    #[rstest]
    fn save_creates_missing_file(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        let path = store.save("es", &tree(json!({"save": "Guardar"}))).unwrap();

        assert_eq!(path, temp_dir.path().join("es.json"));
        assert_eq!(fs::read_to_string(path).unwrap(), "{\n    \"save\": \"Guardar\"\n}");
    }

    #[rstest]
    fn save_empty_tree_writes_empty_object(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        store.save("it", &LocaleTree::new()).unwrap();

        assert_eq!(fs::read_to_string(temp_dir.path().join("it.json")).unwrap(), "{}");
    }

    #[rstest]
    fn save_leaves_no_temp_files(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());

        store.save("en", &tree(json!({"a": "1"}))).unwrap();
        store.save("en", &tree(json!({"a": "2"}))).unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_that!(names, elements_are![eq("en.json")]);
    }

    #[rstest]
    fn save_into_missing_directory_fails(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path().join("missing"));

        let result = store.save("en", &tree(json!({"a": "1"})));

        assert!(matches!(result, Err(StoreError::Io { .. })), "{result:?}");
        assert!(!temp_dir.path().join("missing").exists());
    }

    #[rstest]
    fn save_then_load_round_trips_with_order(temp_dir: TempDir) {
        let store = LocaleStore::new(temp_dir.path());
        let original = tree(json!({"z": "1", "a": {"y": "2", "b": "3"}}));

        store.save("en", &original).unwrap();
        let loaded = store.load("en").unwrap();

        assert_eq!(loaded, original);
        assert_that!(keys_of(&loaded), elements_are![eq("z"), eq("a")]);
    }

    #[cfg(unix)]
    #[rstest]
    fn save_keeps_existing_permissions(temp_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_dir.path().join("en.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        store.save("en", &tree(json!({"a": "1"}))).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[rstest]
    fn exists_reports_file_presence(temp_dir: TempDir) {
        fs::write(temp_dir.path().join("en.json"), "{}").unwrap();
        let store = LocaleStore::new(temp_dir.path());

        assert!(store.exists("en").unwrap());
        assert!(!store.exists("fr").unwrap());
    }

    #[rstest]
    fn non_string_leaves_survive_load_and_save(temp_dir: TempDir) {
        let content = "{\n    \"items\": [\n        \"one\",\n        \"two\"\n    ],\n    \"count\": 3,\n    \"none\": null\n}";
        fs::write(temp_dir.path().join("en.json"), content).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        let loaded = store.load("en").unwrap();
        store.save("en", &loaded).unwrap();

        assert_eq!(fs::read_to_string(temp_dir.path().join("en.json")).unwrap(), content);
    }

    #[cfg(unix)]
    #[rstest]
    fn save_writes_through_symlinked_file(temp_dir: TempDir) {
        use std::os::unix::fs::symlink;

        let shared = temp_dir.path().join("shared");
        let locales = temp_dir.path().join("locales");
        fs::create_dir(&shared).unwrap();
        fs::create_dir(&locales).unwrap();
        fs::write(shared.join("es.json"), r#"{"keep": "me"}"#).unwrap();
        symlink(shared.join("es.json"), locales.join("es.json")).unwrap();
        let store = LocaleStore::new(&locales);

        let mut merged = store.load("es").unwrap();
        merged.insert("save", "Guardar");
        let path = store.save("es", &merged).unwrap();

        assert_eq!(path, locales.join("es.json"));
        assert!(fs::symlink_metadata(&path).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(shared.join("es.json")).unwrap(),
            "{\n    \"keep\": \"me\",\n    \"save\": \"Guardar\"\n}"
        );
        let names: Vec<String> = fs::read_dir(&shared)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_that!(names, elements_are![eq("es.json")]);
    }

    #[cfg(unix)]
    #[rstest]
    fn save_through_dangling_symlink_creates_target(temp_dir: TempDir) {
        use std::os::unix::fs::symlink;

        let shared = temp_dir.path().join("shared");
        fs::create_dir(&shared).unwrap();
        symlink(shared.join("fr.json"), temp_dir.path().join("fr.json")).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        store.save("fr", &tree(json!({"save": "Enregistrer"}))).unwrap();

        let link = fs::symlink_metadata(temp_dir.path().join("fr.json")).unwrap();
        assert!(link.file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(shared.join("fr.json")).unwrap(),
            "{\n    \"save\": \"Enregistrer\"\n}"
        );
    }

    #[cfg(unix)]
    #[rstest]
    fn save_refuses_read_only_file(temp_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_dir.path().join("it.json");
        fs::write(&path, r#"{"a": "1"}"#).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
        let store = LocaleStore::new(temp_dir.path());

        let result = store.save("it", &tree(json!({"a": "2"})));

        let denied = matches!(
            &result,
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::PermissionDenied
        );
        assert!(denied, "{result:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"a": "1"}"#);
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o444);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    proptest! {
        #[test]
        fn save_then_load_is_value_equal(original in arb_locale_tree()) {
            let temp_dir = TempDir::new().unwrap();
            let store = LocaleStore::new(temp_dir.path());

            store.save("en", &original).unwrap();
            let loaded = store.load("en").unwrap();

            prop_assert_eq!(&loaded, &original);
            prop_assert_eq!(keys_of(&loaded), keys_of(&original));
        }
    }
}
