//! Debug command system.
//!
//! This module provides:
//! - Command declaration for owner types (`DebugCommands`, `debug_commands!`)
//! - The runtime registry with fan-out invocation
//! - Scoped registration guards and a per-thread installed registry

mod discover;
mod install;
mod registry;

pub use discover::{discover, CommandOutput, CommandSet, DebugCommands, DeclaredCommand};
pub use install::{install, installed, uninstall};
pub use registry::{
    Binding, CommandEntry, CommandListing, CommandRegistry, DuplicatePolicy, FailurePolicy,
    InvokeReport, Registration, RegistryOptions,
};
