//! Recursive key sorting

use super::{
    LocaleTree,
    LocaleValue,
};

/// Returns a copy of `tree` with keys in ascending order at every level.
#[must_use]
pub fn deep_sort(tree: &LocaleTree) -> LocaleTree {
    let mut sorted = tree.clone();
    sort_keys_recursive(&mut sorted);
    sorted
}

/// In-place variant of [`deep_sort`].
///
/// Keys compare by `str` ordering, i.e. by byte value, so uppercase sorts
/// before lowercase.
pub fn sort_keys_recursive(tree: &mut LocaleTree) {
    tree.sort_keys();
    for value in tree.values_mut() {
        if let LocaleValue::Tree(child) = value {
            sort_keys_recursive(child);
        }
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
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::store::to_json_bytes;
    use crate::test_utils::{
        arb_locale_tree,
        keys_of,
        leaf_paths,
        tree,
    };

    /// Asserts keys are strictly ascending at every level.
    fn assert_sorted(tree: &LocaleTree) {
        let keys: Vec<&String> = tree.keys().collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]), "unsorted keys: {keys:?}");
        for (_, value) in tree {
            if let LocaleValue::Tree(child) = value {
                assert_sorted(child);
            }
        }
    }

    #[rstest]
    fn sorts_top_level_keys() {
        let sorted = deep_sort(&tree(json!({"b": "2", "a": "1"})));

        assert_that!(keys_of(&sorted), elements_are![eq("a"), eq("b")]);
    }

    #[rstest]
    fn sorts_every_nesting_level() {
        let input = tree(json!({
            "zeta": {"b": {"y": "", "x": ""}, "a": ""},
            "alpha": "",
            "Mid": {"k": "", "J": ""}
        }));

        let sorted = deep_sort(&input);

        assert_sorted(&sorted);
        assert_that!(keys_of(&sorted), elements_are![eq("Mid"), eq("alpha"), eq("zeta")]);
    }

    #[rstest]
    fn sorting_preserves_content() {
        let input = tree(json!({"b": {"d": "4", "c": "3"}, "a": "1"}));

        let sorted = deep_sort(&input);

        assert_eq!(sorted, input);
        assert_eq!(sorted.leaf_count(), input.leaf_count());
    }

    #[rstest]
    fn does_not_mutate_input() {
        let input = tree(json!({"b": "2", "a": "1"}));

        let _sorted = deep_sort(&input);

        assert_that!(keys_of(&input), elements_are![eq("b"), eq("a")]);
    }

    #[rstest]
    fn sort_is_idempotent() {
        let once = deep_sort(&tree(json!({"c": {"z": "", "a": ""}, "b": "", "a": {"y": ""}})));
        let twice = deep_sort(&once);

        assert_eq!(twice, once);
        assert_eq!(keys_of(&twice), keys_of(&once));
    }

    #[rstest]
    fn sorts_empty_tree() {
        assert!(deep_sort(&LocaleTree::new()).is_empty());
    }

    #[rstest]
    fn leaves_objects_inside_arrays_alone() {
        let input = tree(json!({"b": [{"z": "1", "a": "2"}], "a": "x"}));

        let sorted = deep_sort(&input);

        assert_eq!(
            String::from_utf8(to_json_bytes(&sorted).unwrap()).unwrap(),
            "{\n    \"a\": \"x\",\n    \"b\": [\n        {\n            \"z\": \"1\",\n            \"a\": \"2\"\n        }\n    ]\n}"
        );
    }

    proptest! {
        #[test]
        fn sorted_tree_is_ordered_and_value_equal(input in arb_locale_tree()) {
            let sorted = deep_sort(&input);

            assert_sorted(&sorted);
            prop_assert_eq!(&sorted, &input);
            prop_assert_eq!(leaf_paths(&sorted).len(), leaf_paths(&input).len());
        }

        #[test]
        fn sorting_twice_matches_sorting_once(input in arb_locale_tree()) {
            let once = deep_sort(&input);
            let twice = deep_sort(&once);

            prop_assert_eq!(to_json_bytes(&twice).unwrap(), to_json_bytes(&once).unwrap());
        }
    }
}
