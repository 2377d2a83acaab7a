/// Keyboard input → discrete game events.
///
/// Each frame drains every pending terminal event and turns fresh key
/// presses into `InputEvent`s:
///   Space / Up / W   →  Jump
///   R                →  Restart
///   Esc / Q / Ctrl+C →  Quit
///
/// Terminals auto-repeat held keys. A key only yields an event on the
/// transition from "not held" to "held", so holding Space jumps once.
/// Uses crossterm's keyboard enhancement for Release events when available,
/// otherwise a key is considered released after `HOLD_TIMEOUT` of silence.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Quit,
    Jump,
    Restart,
}

/// Static key binding. `None` for keys the game ignores.
pub fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(InputEvent::Quit);
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(InputEvent::Jump)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Restart),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(InputEvent::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Events produced by the most recent `drain_events()` call.
    events: Vec<InputEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(8),
            events: Vec::with_capacity(4),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per tick.
    pub fn drain_events(&mut self) -> &[InputEvent] {
        self.events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.feed(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.expire(now);
        &self.events
    }

    /// Apply one key event observed at `now`.
    fn feed(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code, now);
                self.last_active.insert(key.code, now);
                if was_held {
                    return;
                }
                if let Some(ev) = map_key(&key) {
                    self.events.push(ev);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn is_held(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}
