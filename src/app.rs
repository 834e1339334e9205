//! Main application state and event loop.
//!
//! Follows The Elm Architecture: events flow through [`App::update`] and
//! [`App::view`] renders the current state. The overlay sits on top of a
//! small demo scene whose owners register debug commands.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::commands::{CommandRegistry, Registration};
use crate::config::Settings;
use crate::demo::{ActivityLog, World};
use crate::events::{Event, KeyBindings};
use crate::ui::{FocusState, OverlayAction, OverlayController};

/// Number of players spawned at startup.
const INITIAL_PLAYERS: usize = 2;

/// The main application struct that holds all state.
pub struct App {
    registry: Rc<CommandRegistry>,
    overlay: OverlayController,
    keys: KeyBindings,
    focus: FocusState,
    world: Registration<World>,
    log: ActivityLog,
    should_quit: bool,
}

impl App {
    /// Create the application around `registry`.
    pub fn new(registry: Rc<CommandRegistry>, settings: &Settings) -> Self {
        let keys = KeyBindings::from_settings(settings).unwrap_or_else(|e| {
            warn!("Invalid key bindings, using defaults: {}", e);
            KeyBindings::default()
        });

        let log = ActivityLog::new();
        let world = Rc::new(RefCell::new(World::new(&registry, log.clone())));
        let world = registry.attach(world);
        for _ in 0..INITIAL_PLAYERS {
            if let Err(e) = world.owner().borrow_mut().spawn_player() {
                warn!("Failed to spawn initial player: {}", e);
            }
        }

        debug!(
            enabled = registry.is_enabled(),
            commands = registry.len(),
            "Created application"
        );

        Self {
            registry,
            overlay: OverlayController::new(),
            keys,
            focus: FocusState {
                cursor_visible: settings.closed_cursor_visible,
            },
            world,
            log,
            should_quit: false,
        }
    }

    /// Whether the application should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The focus state currently in effect.
    pub fn focus(&self) -> FocusState {
        self.focus
    }

    /// The overlay.
    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    /// The registry commands are registered with.
    pub fn registry(&self) -> &Rc<CommandRegistry> {
        &self.registry
    }

    /// The demo world.
    pub fn world(&self) -> &Rc<RefCell<World>> {
        self.world.owner()
    }

    /// Update the application state based on an event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.keys.is_toggle(&key) {
            if let Some(focus) = self.overlay.toggle(&self.registry, self.focus) {
                self.focus = focus;
            }
            return;
        }

        if self.overlay.is_visible() {
            match self.overlay.handle_input(key, &self.registry) {
                Some(OverlayAction::Closed(focus)) => self.focus = focus,
                Some(OverlayAction::Invoked(report)) => {
                    debug!(command = %report.name, invoked = report.invoked, "Command ran");
                }
                Some(OverlayAction::Failed(message)) => {
                    self.log.push(format!("error: {}", message));
                }
                None => {}
            }
            return;
        }

        if self.keys.is_quit(&key) {
            self.update(Event::Quit);
        }
    }

    /// Render the application UI.
    pub fn view(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_content(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        if self.overlay.is_visible() {
            self.overlay.render(frame, area);
        } else if self.focus.cursor_visible {
            frame.set_cursor_position(Position::new(chunks[2].x, chunks[2].y));
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new("debugmenu")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(title, area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let world = self.world.owner().borrow();
        let players: Vec<Line> = world
            .players()
            .map(|player| {
                let player = player.borrow();
                let color = if player.health() == 0 {
                    Color::Red
                } else {
                    Color::Green
                };
                Line::from(vec![
                    Span::raw(format!("{:<10}", player.name())),
                    Span::styled(format!("{:>3} hp", player.health()), Style::default().fg(color)),
                ])
            })
            .collect();
        let players = Paragraph::new(players)
            .block(Block::default().borders(Borders::ALL).title(" Players "));
        frame.render_widget(players, chunks[0]);

        let height = chunks[1].height.saturating_sub(2) as usize;
        let activity: Vec<Line> = self.log.recent(height).into_iter().map(Line::from).collect();
        let activity = Paragraph::new(activity)
            .block(Block::default().borders(Borders::ALL).title(" Activity "));
        frame.render_widget(activity, chunks[1]);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hint = if self.registry.is_enabled() {
            format!("Press '{}' for debug commands, 'q' to quit", key_label(&self.keys))
        } else {
            "Debug commands disabled. Press 'q' to quit".to_string()
        };

        let footer = Line::from(vec![
            Span::styled(
                format!(" {} commands ", self.registry.len()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(footer), area);
    }
}

fn key_label(keys: &KeyBindings) -> String {
    use crossterm::event::KeyCode;

    match keys.toggle {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other),
    }
}
