//! Key binding definitions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{ConfigError, Settings};

/// Parse a key name from the config file.
///
/// Accepts a single character, `F1`..`F24`, and a few names such as
/// `backtick`, `tilde`, `tab`, `esc` and `insert` (case-insensitive).
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "backtick" | "grave" => Some(KeyCode::Char('`')),
        "tilde" => Some(KeyCode::Char('~')),
        "tab" => Some(KeyCode::Tab),
        "esc" | "escape" => Some(KeyCode::Esc),
        "insert" => Some(KeyCode::Insert),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        _ => lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=24).contains(n))
            .map(KeyCode::F),
    }
}

/// Key binding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Opens and closes the overlay.
    pub toggle: KeyCode,
    /// Quits the application while the overlay is closed.
    pub quit: KeyCode,
}

impl KeyBindings {
    /// Create new key bindings.
    pub fn new(toggle: KeyCode) -> Self {
        Self {
            toggle,
            quit: KeyCode::Char('q'),
        }
    }

    /// Build key bindings from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        parse_key(&settings.toggle_key).map(Self::new).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "toggle_key '{}' is not a recognised key",
                settings.toggle_key
            ))
        })
    }

    /// Whether `key` is the toggle key.
    ///
    /// Shift is ignored so that shifted symbols such as `~` match on
    /// layouts that report the modifier.
    pub fn is_toggle(&self, key: &KeyEvent) -> bool {
        let modifiers = key.modifiers.difference(KeyModifiers::SHIFT);
        key.code == self.toggle && modifiers.is_empty()
    }

    /// Whether `key` quits the application.
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        (key.code == self.quit && key.modifiers.is_empty())
            || (key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(KeyCode::Char('`'))
    }
}
