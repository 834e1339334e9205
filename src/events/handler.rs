//! Event handler implementation.
//!
//! Polls for terminal events and converts them to application events.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};

use super::Event;

/// The tick rate for the event loop in milliseconds.
const TICK_RATE_MS: u64 = 100;

/// Handles application events by polling crossterm for terminal events.
pub struct EventHandler {
    /// The tick rate duration.
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with the default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(TICK_RATE_MS),
        }
    }

    /// Poll for the next event.
    ///
    /// Blocks until an event is available or the tick rate elapses.
    pub fn next(&self) -> std::io::Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }
        Ok(translate(event::read()?))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a crossterm event onto an application event.
///
/// Only key presses are forwarded, so a held toggle key flips the overlay
/// once per press rather than on every repeat or release.
fn translate(event: CrosstermEvent) -> Event {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
        CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
        _ => Event::Tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('`'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_event_handler_new() {
        let handler = EventHandler::new();
        assert_eq!(handler.tick_rate, Duration::from_millis(TICK_RATE_MS));
    }

    #[test]
    fn test_key_press_forwarded() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Event::Key(_)));
    }

    #[test]
    fn test_key_repeat_and_release_dropped() {
        assert!(matches!(translate(key(KeyEventKind::Repeat)), Event::Tick));
        assert!(matches!(translate(key(KeyEventKind::Release)), Event::Tick));
    }

    #[test]
    fn test_resize_forwarded() {
        assert!(matches!(
            translate(CrosstermEvent::Resize(80, 24)),
            Event::Resize(80, 24)
        ));
    }
}
