//! Locale tree data model
//!
//! A locale file is a JSON object whose values are either strings or nested
//! objects of the same shape. Other JSON values (plural arrays, numbers)
//! are carried through untouched. Key order is kept as read so that files
//! written without sorting keep their layout.

mod merge;
mod sort;

use indexmap::IndexMap;
use indexmap::map::{
    IntoIter,
    Iter,
    Keys,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

pub use merge::deep_merge;
pub use sort::{
    deep_sort,
    sort_keys_recursive,
};

/// A value stored under a key of a [`LocaleTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleValue {
    /// Translated leaf string.
    Text(String),
    /// Nested group of keys.
    Tree(LocaleTree),
    /// Any other JSON value. Merged as a leaf, never sorted inside.
    Other(Value),
}

impl LocaleValue {
    /// Returns the nested tree, if this value is one.
    #[must_use]
    pub const fn as_tree(&self) -> Option<&LocaleTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            Self::Text(_) | Self::Other(_) => None,
        }
    }

    /// Returns the leaf string, if this value is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Tree(_) | Self::Other(_) => None,
        }
    }
}

impl From<&str> for LocaleValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for LocaleValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<LocaleTree> for LocaleValue {
    fn from(tree: LocaleTree) -> Self {
        Self::Tree(tree)
    }
}

/// Ordered mapping from key to [`LocaleValue`].
///
/// Equality ignores key order; compare [`LocaleTree::keys`] when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTree(IndexMap<String, LocaleValue>);

impl LocaleTree {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Converts an arbitrary JSON value into a tree.
    ///
    /// # Errors
    /// The value is not an object.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LocaleValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut LocaleValue> {
        self.0.get_mut(key)
    }

    /// Looks up a value by a path of keys, descending through nested trees.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&LocaleValue> {
        let (first, rest) = path.split_first()?;
        let value = self.get(first)?;
        if rest.is_empty() { Some(value) } else { value.as_tree()?.get_path(rest) }
    }

    /// Inserts a value, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<LocaleValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Keys<'_, String, LocaleValue> {
        self.0.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, LocaleValue> {
        self.0.iter()
    }

    /// Counts leaf strings at every level.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.0
            .values()
            .map(|value| match value {
                LocaleValue::Text(_) => 1,
                LocaleValue::Tree(tree) => tree.leaf_count(),
                LocaleValue::Other(_) => 0,
            })
            .sum()
    }

    pub(crate) fn sort_keys(&mut self) {
        self.0.sort_keys();
    }

    pub(crate) fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, String, LocaleValue> {
        self.0.values_mut()
    }
}

impl IntoIterator for LocaleTree {
    type Item = (String, LocaleValue);
    type IntoIter = IntoIter<String, LocaleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LocaleTree {
    type Item = (&'a String, &'a LocaleValue);
    type IntoIter = Iter<'a, String, LocaleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<LocaleValue>> FromIterator<(K, V)> for LocaleTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// Fresh translations for one run, keyed by locale identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationBatch(IndexMap<String, LocaleTree>);

impl TranslationBatch {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, locale: impl Into<String>, fragment: LocaleTree) {
        self.0.insert(locale.into(), fragment);
    }

    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&LocaleTree> {
        self.0.get(locale)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn locales(&self) -> Keys<'_, String, LocaleTree> {
        self.0.keys()
    }
}

impl IntoIterator for TranslationBatch {
    type Item = (String, LocaleTree);
    type IntoIter = IntoIter<String, LocaleTree>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, LocaleTree)> for TranslationBatch {
    fn from_iter<I: IntoIterator<Item = (K, LocaleTree)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(locale, tree)| (locale.into(), tree)).collect())
    }
}
