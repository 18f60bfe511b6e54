//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    Settings,
    SettingsOverrides,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: Settings,

    /// 読み込んだ設定ファイルのパス
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: Settings::default(), config_path: None }
    }

    /// ディレクトリから設定を読み込む
    ///
    /// # Arguments
    /// * `dir` - `.locale-translate.json` を探すディレクトリ。`None` ならデフォルト値
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, dir: Option<&Path>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from directory: {:?}", dir);

        let (settings, config_path) = match dir {
            Some(dir) => match loader::load_from_dir(dir)? {
                Some(settings) => (settings, Some(dir.join(super::CONFIG_FILE_NAME))),
                None => (Settings::default(), None),
            },
            None => (Settings::default(), None),
        };

        self.replace(settings, config_path)
    }

    /// 明示的に指定されたファイルから設定を読み込む
    ///
    /// # Errors
    /// - ファイルが存在しない、または読み込めない
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_from_path(path)?;
        self.replace(settings, Some(path.to_path_buf()))
    }

    /// コマンドライン引数による上書きを適用する
    ///
    /// # Errors
    /// 上書き後の設定がバリデーションに失敗した場合。現在の設定は変更されない
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) -> Result<(), ConfigError> {
        let settings = overrides.apply(self.current_settings.clone());
        self.update_settings(settings)
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, new_settings: Settings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        // バリデーション
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        // 設定を更新
        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &Settings {
        &self.current_settings
    }

    /// 読み込んだ設定ファイルのパスを取得
    #[must_use]
    pub const fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    fn replace(&mut self, settings: Settings, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        // 設定を保存
        self.current_settings = settings;
        self.config_path = config_path;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }
}
