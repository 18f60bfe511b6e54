//! Configuration file, validation and command-line overrides
mod loader;
mod manager;
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    ModelConfig,
    Provider,
    Settings,
    SettingsOverrides,
    ValidationError,
};
