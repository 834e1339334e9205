//! Centralized error types for debugmenu.
//!
//! Registry operations report failures through [`CommandError`]; the
//! application layer folds everything into [`AppError`] for display in the
//! overlay status line. All error types use `thiserror`.

use thiserror::Error;

use crate::config::ConfigError;

/// Why a single binding could not run during a fan-out.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The owner was dropped without being deregistered.
    #[error("owner no longer exists")]
    OwnerDropped,

    /// The owner is already borrowed, usually because one of its own
    /// commands is running and invoked the registry again.
    #[error("owner is busy running another command")]
    OwnerBusy,

    /// The command itself reported an error.
    #[error("{0}")]
    Failed(anyhow::Error),
}

/// A failed binding, identified by its owner type and method.
#[derive(Debug, Error)]
#[error("{owner}::{method}: {error}")]
pub struct BindingFailure {
    /// Short name of the owner type.
    pub owner: &'static str,
    /// Method identifier within the owner type.
    pub method: &'static str,
    /// What went wrong.
    pub error: BindingError,
}

/// Errors returned by [`CommandRegistry::invoke`](crate::commands::CommandRegistry::invoke).
#[derive(Debug, Error)]
pub enum CommandError {
    /// No bindings are registered under the requested name.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The registry is the disabled no-op variant.
    #[error("debug commands are disabled")]
    Disabled,

    /// One or more bindings failed during the fan-out.
    #[error("command '{name}' failed for {} binding(s)", .failures.len())]
    FanOut {
        /// The invoked command name.
        name: String,
        /// Bindings that ran successfully.
        invoked: usize,
        /// Bindings that were never reached because the fan-out aborted.
        skipped: usize,
        /// The bindings that failed, in invocation order.
        failures: Vec<BindingFailure>,
    },
}

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Command invocation errors.
    #[error("{0}")]
    Command(#[from] CommandError),

    /// IO errors (file system, terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Get a user-friendly message for display.
    ///
    /// Fan-out failures list the first failing binding and how many more
    /// there were, which fits on the overlay's single status line.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Using defaults.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Check the file is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Command(e) => match e {
                CommandError::UnknownCommand(name) => {
                    format!("'{}' is no longer registered.", name)
                }
                CommandError::Disabled => "Debug commands are disabled.".to_string(),
                CommandError::FanOut {
                    name,
                    invoked,
                    failures,
                    ..
                } => {
                    let first = failures
                        .first()
                        .map(|f| f.to_string())
                        .unwrap_or_default();
                    match failures.len() {
                        1 => format!("{} ({} ok): {}", name, invoked, first),
                        n => format!("{} ({} ok): {} (+{} more)", name, invoked, first, n - 1),
                    }
                }
            },
            AppError::Io(_) => "A file or terminal operation failed.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(method: &'static str, msg: &str) -> BindingFailure {
        BindingFailure {
            owner: "Player",
            method,
            error: BindingError::Failed(anyhow::anyhow!(msg.to_string())),
        }
    }

    #[test]
    fn test_binding_failure_display() {
        let failure = failure("jump", "legs broken");
        assert_eq!(failure.to_string(), "Player::jump: legs broken");
    }

    #[test]
    fn test_binding_error_display() {
        assert_eq!(
            BindingError::OwnerDropped.to_string(),
            "owner no longer exists"
        );
        assert!(BindingError::OwnerBusy.to_string().contains("busy"));
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::UnknownCommand("Heal".to_string());
        assert_eq!(err.to_string(), "unknown command 'Heal'");

        let err = CommandError::FanOut {
            name: "Jump".to_string(),
            invoked: 1,
            skipped: 0,
            failures: vec![failure("jump", "a"), failure("jump", "b")],
        };
        assert_eq!(err.to_string(), "command 'Jump' failed for 2 binding(s)");
    }

    #[test]
    fn test_app_error_from_command_error() {
        let app_err: AppError = CommandError::Disabled.into();
        assert!(matches!(app_err, AppError::Command(CommandError::Disabled)));
    }

    #[test]
    fn test_user_message_unknown_command() {
        let err = AppError::from(CommandError::UnknownCommand("Heal".to_string()));
        assert_eq!(err.user_message(), "'Heal' is no longer registered.");
    }

    #[test]
    fn test_user_message_single_failure() {
        let err = AppError::from(CommandError::FanOut {
            name: "Jump".to_string(),
            invoked: 2,
            skipped: 0,
            failures: vec![failure("jump", "legs broken")],
        });
        assert_eq!(err.user_message(), "Jump (2 ok): Player::jump: legs broken");
    }

    #[test]
    fn test_user_message_many_failures() {
        let err = AppError::from(CommandError::FanOut {
            name: "Jump".to_string(),
            invoked: 0,
            skipped: 0,
            failures: vec![failure("jump", "a"), failure("jump", "b"), failure("jump", "c")],
        });
        assert!(err.user_message().ends_with("(+2 more)"));
    }

    #[test]
    fn test_user_message_config_validation() {
        let err = AppError::Config(ConfigError::ValidationError("bad key".to_string()));
        assert!(err.user_message().contains("bad key"));
    }

    #[test]
    fn test_terminal_error() {
        let err = AppError::terminal("raw mode unavailable");
        assert_eq!(err.to_string(), "Terminal error: raw mode unavailable");
        assert_eq!(err.user_message(), "Terminal error: raw mode unavailable");
    }

    #[test]
    fn test_io_error_from() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(err.user_message(), "A file or terminal operation failed.");
    }
}
