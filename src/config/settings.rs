//! Application settings configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{config_path, ConfigError, Result};
use crate::commands::{DuplicatePolicy, FailurePolicy, RegistryOptions};
use crate::events::parse_key;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "DEBUGMENU_CONFIG";

/// Debug menu settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether the registry records commands at all.
    pub enabled: bool,
    /// Key that opens and closes the overlay.
    pub toggle_key: String,
    /// Whether the terminal cursor is shown while the overlay is closed.
    pub closed_cursor_visible: bool,
    /// What to do when an owner registers twice.
    pub duplicates: DuplicatePolicy,
    /// What to do when a binding fails during fan-out.
    pub failures: FailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            toggle_key: "`".to_string(),
            closed_cursor_visible: false,
            duplicates: DuplicatePolicy::default(),
            failures: FailurePolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from `$DEBUGMENU_CONFIG` or the default config path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => path.into(),
            None => config_path()?,
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate settings from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(settings)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` if the toggle key is not a
    /// recognised key name.
    pub fn validate(&self) -> Result<()> {
        if parse_key(&self.toggle_key).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "toggle_key '{}' is not a recognised key",
                self.toggle_key
            )));
        }
        Ok(())
    }

    /// Registry options derived from these settings.
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            duplicates: self.duplicates,
            failures: self.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert_eq!(settings.toggle_key, "`");
        assert!(!settings.closed_cursor_visible);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.registry_options(), RegistryOptions::default());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config("toggle_key = \"F12\"\n");

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.toggle_key, "F12");
        assert!(settings.enabled);
        assert_eq!(settings.failures, FailurePolicy::Continue);
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
enabled = false
toggle_key = "~"
closed_cursor_visible = true
duplicates = "allow"
failures = "abort"
"#,
        );

        let settings = Settings::load_from(file.path()).unwrap();

        assert!(!settings.enabled);
        assert_eq!(settings.toggle_key, "~");
        assert!(settings.closed_cursor_visible);
        assert_eq!(
            settings.registry_options(),
            RegistryOptions {
                duplicates: DuplicatePolicy::Allow,
                failures: FailurePolicy::Abort,
            }
        );
    }

    #[test]
    fn test_invalid_toggle_key_rejected() {
        let file = write_config("toggle_key = \"NotAKey\"\n");

        let err = Settings::load_from(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("NotAKey"));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let file = write_config("enabled = \"yes please\"\n");

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let file = write_config("failures = \"retry\"\n");

        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();

        let err = Settings::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    #[serial]
    fn test_load_uses_env_override() {
        let file = write_config("toggle_key = \"F5\"\n");
        std::env::set_var(CONFIG_ENV, file.path());

        let settings = Settings::load();
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(settings.unwrap().toggle_key, "F5");
    }

    #[test]
    #[serial]
    fn test_load_missing_env_file_uses_defaults() {
        let dir = tempdir().unwrap();
        std::env::set_var(CONFIG_ENV, dir.path().join("nope.toml"));

        let settings = Settings::load();
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(settings.unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let settings = Settings {
            toggle_key: "F1".to_string(),
            failures: FailurePolicy::Abort,
            ..Settings::default()
        };

        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("failures = \"abort\""));
        assert_eq!(toml::from_str::<Settings>(&text).unwrap(), settings);
    }
}
