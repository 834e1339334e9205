//! Debug command overlay.
//!
//! When opened, the overlay snapshots the registry and shows one activator
//! per command name. Activating a row invokes that name on the registry,
//! which fans out to every binding. Closing drops the activators and hands
//! back the focus state that was in effect before opening.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use tracing::debug;

use super::Theme;
use crate::commands::{CommandRegistry, InvokeReport};
use crate::error::AppError;

/// Input focus state the overlay saves on open and restores on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusState {
    /// Whether the terminal cursor is shown.
    pub cursor_visible: bool,
}

impl FocusState {
    /// Focus while the overlay is open.
    pub const OVERLAY: FocusState = FocusState {
        cursor_visible: true,
    };
}

/// One rendered row, bound to a command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activator {
    name: String,
    bindings: usize,
}

impl Activator {
    /// The command name this row invokes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many bindings the name had when the row was built.
    pub fn bindings(&self) -> usize {
        self.bindings
    }
}

/// Outcome of overlay input handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayAction {
    /// The selected command ran on every binding.
    Invoked(InvokeReport),
    /// The selected command failed; the message is for display.
    Failed(String),
    /// The overlay closed; apply this focus state.
    Closed(FocusState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    message: String,
    is_error: bool,
}

/// Toggleable overlay listing the registry's commands.
pub struct OverlayController {
    activators: Vec<Activator>,
    selected: usize,
    visible: bool,
    saved_focus: Option<FocusState>,
    status: Option<Status>,
    theme: Theme,
}

impl OverlayController {
    /// Create a closed overlay.
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    /// Create a closed overlay with a custom theme.
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            activators: Vec::new(),
            selected: 0,
            visible: false,
            saved_focus: None,
            status: None,
            theme,
        }
    }

    /// Check if the overlay is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The rendered activators, empty while closed.
    pub fn activators(&self) -> &[Activator] {
        &self.activators
    }

    /// The highlighted activator.
    pub fn selected(&self) -> Option<&Activator> {
        self.activators.get(self.selected)
    }

    /// Message from the last activation.
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.message.as_str())
    }

    /// Open the overlay.
    ///
    /// `current` is remembered and returned by [`close`](Self::close).
    /// Returns the focus state to apply, or `None` if the overlay cannot
    /// open because the registry is disabled.
    pub fn open(&mut self, registry: &CommandRegistry, current: FocusState) -> Option<FocusState> {
        if !registry.is_enabled() {
            debug!("Debug overlay unavailable, registry is disabled");
            return None;
        }
        if self.visible {
            return Some(FocusState::OVERLAY);
        }

        self.saved_focus = Some(current);
        self.visible = true;
        self.selected = 0;
        self.status = None;
        self.refresh(registry);
        debug!(commands = self.activators.len(), "Opened debug overlay");

        Some(FocusState::OVERLAY)
    }

    /// Close the overlay and return the focus state saved on open.
    ///
    /// Returns `None` if the overlay was not open.
    pub fn close(&mut self) -> Option<FocusState> {
        if !self.visible {
            return None;
        }

        self.visible = false;
        self.activators.clear();
        self.selected = 0;
        debug!("Closed debug overlay");

        Some(self.saved_focus.take().unwrap_or_default())
    }

    /// Open if closed, close if open.
    pub fn toggle(&mut self, registry: &CommandRegistry, current: FocusState) -> Option<FocusState> {
        if self.visible {
            self.close()
        } else {
            self.open(registry, current)
        }
    }

    /// Rebuild the activators from the registry, keeping the selection on
    /// the same name when it still exists.
    pub fn refresh(&mut self, registry: &CommandRegistry) {
        let previous = self.selected().map(|a| a.name.clone());

        self.activators = registry
            .list()
            .iter()
            .map(|entry| Activator {
                name: entry.name.clone(),
                bindings: entry.bindings.len(),
            })
            .collect();

        self.selected = previous
            .and_then(|name| self.activators.iter().position(|a| a.name == name))
            .unwrap_or_else(|| self.selected.min(self.activators.len().saturating_sub(1)));
    }

    /// Invoke the selected activator's command.
    fn activate(&mut self, registry: &CommandRegistry) -> Option<OverlayAction> {
        let name = self.selected()?.name.clone();

        let action = match registry.invoke(&name) {
            Ok(report) => {
                self.status = Some(Status {
                    message: format!("{} ran on {} binding(s)", report.name, report.invoked),
                    is_error: false,
                });
                OverlayAction::Invoked(report)
            }
            Err(err) => {
                let message = AppError::from(err).user_message();
                self.status = Some(Status {
                    message: message.clone(),
                    is_error: true,
                });
                OverlayAction::Failed(message)
            }
        };

        // The command may have registered or removed owners.
        self.refresh(registry);
        Some(action)
    }

    /// Handle keyboard input.
    ///
    /// The toggle key is handled by the caller; this covers navigation,
    /// activation (Enter) and closing (Esc).
    pub fn handle_input(
        &mut self,
        key: KeyEvent,
        registry: &CommandRegistry,
    ) -> Option<OverlayAction> {
        if !self.visible {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, KeyModifiers::NONE) => self.close().map(OverlayAction::Closed),

            (KeyCode::Enter, KeyModifiers::NONE) => self.activate(registry),

            (KeyCode::Down, KeyModifiers::NONE)
            | (KeyCode::Tab, KeyModifiers::NONE)
            | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                if !self.activators.is_empty() {
                    self.selected = (self.selected + 1) % self.activators.len();
                }
                None
            }

            (KeyCode::Up, KeyModifiers::NONE)
            | (KeyCode::BackTab, KeyModifiers::SHIFT)
            | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                if !self.activators.is_empty() {
                    self.selected = if self.selected == 0 {
                        self.activators.len() - 1
                    } else {
                        self.selected - 1
                    };
                }
                None
            }

            _ => None,
        }
    }

    /// Render the overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let width = 48.min(area.width.saturating_sub(4));
        let rows = self.activators.len().max(1) as u16;
        let height = (rows + 4).min(area.height.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 6;
        let overlay_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, overlay_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(" Debug Commands ")
            .title_style(self.theme.border().add_modifier(Modifier::BOLD));

        let inner = block.inner(overlay_area);
        frame.render_widget(block, overlay_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Activators
                Constraint::Length(1), // Status
            ])
            .split(inner);

        self.render_activators(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
    }

    fn render_activators(&self, frame: &mut Frame, area: Rect) {
        if self.activators.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No debug commands registered",
                self.theme.hint(),
            )));
            frame.render_widget(empty, area);
            return;
        }

        let visible_count = area.height as usize;
        let scroll_offset = if self.selected >= visible_count {
            self.selected - visible_count + 1
        } else {
            0
        };

        let items: Vec<ListItem> = self
            .activators
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(visible_count)
            .map(|(idx, activator)| self.render_activator(activator, idx == self.selected))
            .collect();

        frame.render_widget(List::new(items), area);

        if visible_count > 0 {
            let row = (self.selected - scroll_offset) as u16;
            frame.set_cursor_position(Position::new(area.x, area.y + row));
        }
    }

    fn render_activator<'a>(&self, activator: &'a Activator, is_selected: bool) -> ListItem<'a> {
        let mut spans = vec![
            Span::raw(if is_selected { "> " } else { "  " }),
            Span::raw(activator.name.as_str()),
        ];
        if activator.bindings > 1 {
            spans.push(Span::styled(
                format!(" x{}", activator.bindings),
                self.theme.hint(),
            ));
        }

        let item = ListItem::new(Line::from(spans));
        if is_selected {
            item.style(self.theme.selected())
        } else {
            item
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(status) => Line::from(Span::styled(
                status.message.as_str(),
                self.theme.status(status.is_error),
            )),
            None => Line::from(Span::styled(
                "Enter run  Esc close  j/k move",
                self.theme.hint(),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new()
    }
}
