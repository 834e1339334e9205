//! Command discovery for owner types.
//!
//! An owner type declares which of its methods are debug commands by
//! implementing [`DebugCommands`]. The [`debug_commands!`](crate::debug_commands)
//! macro generates that impl from a list of `"Name" => method` pairs:
//!
//! ```
//! use debugmenu::debug_commands;
//!
//! struct Door {
//!     open: bool,
//! }
//!
//! impl Door {
//!     fn toggle(&mut self) {
//!         self.open = !self.open;
//!     }
//! }
//!
//! debug_commands!(Door {
//!     "Toggle Door" => toggle,
//! });
//!
//! let commands = debugmenu::commands::discover::<Door>();
//! assert_eq!(commands[0].name(), "Toggle Door");
//! assert_eq!(commands[0].method(), "toggle");
//! ```

use std::fmt;
use std::rc::Rc;

use tracing::warn;

/// Type-erased callable for one declared command.
pub(crate) type CommandFn<T> = Rc<dyn Fn(&mut T) -> anyhow::Result<()>>;

/// Return types a debug command method may have.
///
/// Commands take no arguments and return nothing useful; they can only
/// report whether they failed.
pub trait CommandOutput {
    /// Convert the method's return value into a success/failure result.
    fn into_result(self) -> anyhow::Result<()>;
}

impl CommandOutput for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl CommandOutput for anyhow::Result<()> {
    fn into_result(self) -> anyhow::Result<()> {
        self
    }
}

/// Capability implemented by types whose instances expose debug commands.
///
/// The declared set must be the same on every call; the registry relies on
/// that to find and remove an owner's bindings on deregistration.
pub trait DebugCommands: Sized + 'static {
    /// Add this type's commands to `commands`.
    fn describe_commands(commands: &mut CommandSet<Self>);
}

/// One command declared by an owner type.
pub struct DeclaredCommand<T> {
    name: String,
    method: &'static str,
    call: CommandFn<T>,
}

impl<T> DeclaredCommand<T> {
    /// The command name shown in the overlay.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the method within the owner type.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Run the command against `owner`.
    pub fn call(&self, owner: &mut T) -> anyhow::Result<()> {
        (self.call)(owner)
    }

    pub(crate) fn into_callable(self) -> CommandFn<T> {
        self.call
    }
}

impl<T> fmt::Debug for DeclaredCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredCommand")
            .field("name", &self.name)
            .field("method", &self.method)
            .finish()
    }
}

/// Builder collecting the commands of one owner type.
pub struct CommandSet<T> {
    commands: Vec<DeclaredCommand<T>>,
}

impl<T: 'static> CommandSet<T> {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Declare `method` as the command `name`.
    ///
    /// Names are case-sensitive and must not be empty; an empty name is
    /// logged and skipped.
    pub fn add<F, R>(&mut self, name: impl Into<String>, method: &'static str, f: F) -> &mut Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: CommandOutput,
    {
        let name = name.into();
        if name.is_empty() {
            warn!(
                owner = std::any::type_name::<T>(),
                method, "Ignoring debug command with an empty name"
            );
            return self;
        }

        self.commands.push(DeclaredCommand {
            name,
            method,
            call: Rc::new(move |owner: &mut T| f(owner).into_result()),
        });
        self
    }

    /// Number of commands declared so far.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands have been declared.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collect the commands declared by `T`, in declaration order.
pub fn discover<T: DebugCommands>() -> Vec<DeclaredCommand<T>> {
    let mut commands = CommandSet::new();
    T::describe_commands(&mut commands);
    commands.commands
}

/// Implement [`DebugCommands`] for a type from `"Name" => method` pairs.
///
/// Each method must take `&mut self` and return either `()` or
/// `anyhow::Result<()>`.
#[macro_export]
macro_rules! debug_commands {
    ($owner:ty { $($name:expr => $method:ident),* $(,)? }) => {
        impl $crate::commands::DebugCommands for $owner {
            fn describe_commands(commands: &mut $crate::commands::CommandSet<Self>) {
                $(
                    commands.add($name, stringify!($method), <$owner>::$method);
                )*
            }
        }
    };
}
