//! Theme and styling configuration.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the overlay and demo screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Border and title color.
    pub accent: Color,
    /// Background of the selected activator.
    pub selection: Color,
    /// Hints and secondary text.
    pub muted: Color,
    /// Status line after a successful command.
    pub success: Color,
    /// Status line after a failed command.
    pub error: Color,
}

impl Theme {
    /// Style for borders and titles.
    pub fn border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Style for the selected row.
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for secondary text.
    pub fn hint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for a status message.
    pub fn status(&self, is_error: bool) -> Style {
        Style::default().fg(if is_error { self.error } else { self.success })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            selection: Color::DarkGray,
            muted: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
        }
    }
}
