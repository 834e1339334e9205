//! Configuration management for debugmenu.
//!
//! Settings are read from a TOML file in the user's config directory. A
//! missing file is not an error; every field has a default.

mod settings;

use std::path::PathBuf;

use thiserror::Error;

pub use settings::{Settings, CONFIG_ENV};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The config file exists but could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config file is not valid TOML for [`Settings`].
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value parsed but is not acceptable.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Default location of the config file.
///
/// - Linux: `~/.config/debugmenu/config.toml`
/// - macOS: `~/Library/Application Support/debugmenu/config.toml`
/// - Windows: `C:\Users\<User>\AppData\Roaming\debugmenu\config.toml`
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("debugmenu").join("config.toml"))
}
