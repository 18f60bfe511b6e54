//! locale-translate
//!
//! JSON ロケールファイル向けの翻訳・マージツール。チャットモデルで翻訳した文字列を
//! 既存のロケールファイルへ非破壊的にマージし、必要に応じてキーをソートして書き戻す。

pub mod cli;
pub mod config;
pub mod locale;
pub mod source;
pub mod store;
pub mod tree;
pub mod updater;

#[cfg(test)]
mod test_utils;

pub use source::{
    TranslationRequest,
    TranslationSource,
};
pub use store::LocaleStore;
pub use tree::{
    LocaleTree,
    LocaleValue,
    TranslationBatch,
};
pub use updater::{
    FailurePolicy,
    MergeConfiguration,
    update_locales,
};
