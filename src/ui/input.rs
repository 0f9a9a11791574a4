/// Keyboard input.
///
/// Drains pending crossterm events once per frame and maps key presses to
/// session `Action`s. The quiz only needs edge-triggered presses, so
/// Release events are dropped.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::session::Action;

pub struct InputState {
    /// Actions collected during the most recent `drain_events()`.
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            actions: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        self.actions.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(action) = map_key(&key) {
                    self.actions.push(action);
                }
            }
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key → action. Ctrl+C quits from anywhere.
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::PageUp => Some(Action::Previous),
        KeyCode::Tab | KeyCode::F(1) => Some(Action::Hint),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Char(c)),
        _ => None,
    }
}
