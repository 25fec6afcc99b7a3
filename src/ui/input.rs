/// Input state tracker.
///
/// Drains every pending terminal event once per frame and keeps:
///   - keys freshly pressed this frame (edge-triggered actions)
///   - left-button clicks, in terminal cell coordinates
///   - the raw key events, for modifier checks (Ctrl+C)
///
/// Mouse reporting must be enabled by the renderer (`EnableMouseCapture`).

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    fresh_presses: Vec<KeyCode>,
    clicks: Vec<(u16, u16)>,
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before advancing the game.
    pub fn drain_events(&mut self) {
        self.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.absorb(ev),
                Err(_) => break,
            }
        }
    }

    fn clear(&mut self) {
        self.fresh_presses.clear();
        self.clicks.clear();
        self.raw_events.clear();
    }

    /// Fold one terminal event into this frame's state.
    pub fn absorb(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.raw_events.push(key);
                if !self.fresh_presses.contains(&key.code) {
                    self.fresh_presses.push(key.code);
                }
            }
            Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                self.clicks.push((m.column, m.row));
            }
            _ => {}
        }
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Left clicks this frame, oldest first.
    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
