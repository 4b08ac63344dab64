/// Keyboard state tracker.
///
/// The maze samples the set of held keys once per tick, so this keeps a
/// "held" view per key plus the fresh presses of the latest drain (for
/// pause, start and the close prompt).
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{DirectionKey, PressedKeys};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Keys that toggle pause.
pub const PAUSE_KEYS: [KeyCode; 3] = [KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];

/// Map a terminal key to the maze key it stands for.
pub fn direction_key(code: KeyCode) -> Option<DirectionKey> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(DirectionKey::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(DirectionKey::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(DirectionKey::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(DirectionKey::Down),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(DirectionKey::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the latest drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the tick.
    pub fn drain_events(&mut self) {
        let mut pending = Vec::new();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                pending.push(key);
            }
        }
        self.apply(pending, Instant::now());
    }

    fn apply(&mut self, keys: Vec<KeyEvent>, now: Instant) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        for key in keys {
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                KeyEventKind::Release => {}
                _ => {
                    if !self.held_at(key.code, now) {
                        self.fresh_presses.push(key.code);
                    }
                    self.last_active.insert(key.code, now);
                }
            }
            self.raw_events.push(key);
        }

        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Held maze keys, sampled for this tick.
    pub fn pressed_keys(&self) -> PressedKeys {
        let now = Instant::now();
        self.last_active
            .keys()
            .filter(|code| self.held_at(**code, now))
            .filter_map(|code| direction_key(*code))
            .collect()
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Any fresh press at all (Ready screen, close prompt).
    pub fn any_key_pressed(&self) -> bool {
        !self.fresh_presses.is_empty()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }
}
