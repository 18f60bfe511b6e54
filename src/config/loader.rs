//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    Settings,
};

/// 作業ディレクトリで探す設定ファイル名
pub const CONFIG_FILE_NAME: &str = ".locale-translate.json";

/// ディレクトリから設定を読み込む
///
/// `.locale-translate.json` ファイルを探して読み込む
///
/// # Arguments
/// * `dir` - 設定ファイルを探すディレクトリ
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
pub(super) fn load_from_dir(dir: &Path) -> Result<Option<Settings>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_path(&config_path).map(Some)
}

/// 指定されたパスから設定を読み込む
///
/// 明示的に指定されたファイルが存在しない場合はエラーになる
pub(super) fn load_from_path(config_path: &Path) -> Result<Settings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    Ok(settings)
}
