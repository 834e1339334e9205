//! User interface: the debug command overlay and its styling.

mod overlay;
pub mod theme;

pub use overlay::{Activator, FocusState, OverlayAction, OverlayController};
pub use theme::Theme;
