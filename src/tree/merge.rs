//! Non-destructive deep merge of locale trees

use super::{
    LocaleTree,
    LocaleValue,
};

/// Overlays `updates` onto `original` in place.
///
/// Nested trees present on both sides are merged recursively. Any other
/// incoming value replaces what `original` holds under that key, so a leaf
/// can be replaced by a tree and the other way around. Keys that only exist
/// in `original` are never touched.
///
/// Overwritten keys keep their position; new keys are appended.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use locale_translate::tree::{LocaleTree, deep_merge};
///
/// let mut original = LocaleTree::from_json(json!({"a": {"x": "1"}})).unwrap();
/// let updates = LocaleTree::from_json(json!({"a": {"y": "2"}})).unwrap();
///
/// deep_merge(&mut original, updates);
///
/// assert_eq!(original, LocaleTree::from_json(json!({"a": {"x": "1", "y": "2"}})).unwrap());
/// ```
pub fn deep_merge(original: &mut LocaleTree, updates: LocaleTree) {
    for (key, incoming) in updates {
        let incoming = match (original.get_mut(&key), incoming) {
            (Some(LocaleValue::Tree(existing)), LocaleValue::Tree(fragment)) => {
                deep_merge(existing, fragment);
                continue;
            }
            (_, incoming) => incoming,
        };
        original.insert(key, incoming);
    }
}
