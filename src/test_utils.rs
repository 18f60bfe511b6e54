//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use proptest::collection::vec;
use proptest::prelude::{
    Just,
    Strategy,
    any,
    prop_oneof,
};
use serde_json::{
    Value,
    json,
};

use crate::tree::{
    LocaleTree,
    LocaleValue,
};

/// JSON 値からテスト用の `LocaleTree` を作成する
///
/// # Panics
/// オブジェクト以外の値を渡した場合
pub(crate) fn tree(value: Value) -> LocaleTree {
    LocaleTree::from_json(value).unwrap()
}

/// トップレベルのキーを順序どおりに取得する
pub(crate) fn keys_of(tree: &LocaleTree) -> Vec<String> {
    tree.keys().cloned().collect()
}

/// 葉までのキーパスをすべて列挙する（空のサブツリーは含まない）
pub(crate) fn leaf_paths(tree: &LocaleTree) -> Vec<Vec<String>> {
    tree.iter()
        .flat_map(|(key, value)| match value {
            LocaleValue::Tree(child) => leaf_paths(child)
                .into_iter()
                .map(|mut path| {
                    path.insert(0, key.clone());
                    path
                })
                .collect::<Vec<_>>(),
            LocaleValue::Text(_) | LocaleValue::Other(_) => vec![vec![key.clone()]],
        })
        .collect()
}

/// キーパスでツリーを辿る
pub(crate) fn value_at<'a>(tree: &'a LocaleTree, path: &[String]) -> Option<&'a LocaleValue> {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    tree.get_path(&path)
}

/// 衝突が起きやすいよう小さなアルファベットから生成するキー
fn arb_key() -> impl Strategy<Value = String> {
    "[a-cA-C_]{1,2}"
}

/// 文字列を中心に、数値・配列・null も混ざる葉
fn arb_leaf() -> impl Strategy<Value = LocaleValue> {
    prop_oneof![
        4 => "[a-zA-Zäöü ]{0,6}".prop_map(LocaleValue::Text),
        1 => any::<i32>().prop_map(|n| LocaleValue::Other(json!(n))),
        1 => Just(LocaleValue::Other(json!(["one", "other"]))),
        1 => Just(LocaleValue::Other(Value::Null)),
    ]
}

/// 任意の深さのネストを持つ `LocaleTree`
pub(crate) fn arb_locale_tree() -> impl Strategy<Value = LocaleTree> {
    let value = arb_leaf().prop_recursive(4, 48, 5, |inner| {
        vec((arb_key(), inner), 0..5)
            .prop_map(|entries| LocaleValue::Tree(entries.into_iter().collect()))
    });
    vec((arb_key(), value), 0..6).prop_map(|entries| entries.into_iter().collect::<LocaleTree>())
}
