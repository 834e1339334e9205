//! Event handling for the application.
//!
//! This module handles keyboard input and the periodic tick.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{parse_key, KeyBindings};

/// Events consumed by the application's update loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// No input arrived within the tick rate.
    Tick,
    /// The application should exit.
    Quit,
}
