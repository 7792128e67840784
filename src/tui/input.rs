// Input translation: crossterm events -> NavKey
//
// Two concerns live here:
// - The key map (h/j/k/l, arrows, L, r, f, q, Ctrl+C ...)
// - Key behaviors: navigation keys repeat while held, action keys fire once
//   per press. Many terminals never send Release events, so action keys are
//   additionally debounced by time.

use super::navigation::NavKey;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lines scrolled per mouse wheel notch
pub const WHEEL_STEP: i8 = 3;

/// Minimum gap between two triggers of a held action key
const ACTION_DEBOUNCE: Duration = Duration::from_millis(150);

/// How a key behaves when pressed or held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBehavior {
    /// Fire once per press (Enter, Esc, toggles)
    StateChange,
    /// Fire on press and on every terminal repeat (arrows, paging)
    Repeatable,
}

impl KeyBehavior {
    pub fn of(key: NavKey) -> Self {
        match key {
            NavKey::Left
            | NavKey::Right
            | NavKey::Up
            | NavKey::Down
            | NavKey::PageUp
            | NavKey::PageDown
            | NavKey::Wheel(_) => KeyBehavior::Repeatable,
            NavKey::Home
            | NavKey::End
            | NavKey::Enter
            | NavKey::Escape
            | NavKey::ToggleLogs
            | NavKey::ToggleFollow
            | NavKey::Reattach
            | NavKey::Quit => KeyBehavior::StateChange,
        }
    }
}

/// Map a key event to a navigation key, ignoring press/release
pub fn map_key(event: &KeyEvent) -> Option<NavKey> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(NavKey::Quit),
            _ => None,
        };
    }

    let key = match event.code {
        KeyCode::Left | KeyCode::Char('h') => NavKey::Left,
        KeyCode::Right | KeyCode::Char('l') => NavKey::Right,
        KeyCode::Up | KeyCode::Char('k') => NavKey::Up,
        KeyCode::Down | KeyCode::Char('j') => NavKey::Down,
        KeyCode::PageUp => NavKey::PageUp,
        KeyCode::PageDown => NavKey::PageDown,
        KeyCode::Home | KeyCode::Char('g') => NavKey::Home,
        KeyCode::End | KeyCode::Char('G') => NavKey::End,
        KeyCode::Enter => NavKey::Enter,
        KeyCode::Esc => NavKey::Escape,
        // Capital L only; lowercase l is "right"
        KeyCode::Char('L') => NavKey::ToggleLogs,
        KeyCode::Char('r') | KeyCode::Char('R') => NavKey::Reattach,
        KeyCode::Char('f') | KeyCode::Char('F') => NavKey::ToggleFollow,
        KeyCode::Char('q') | KeyCode::Char('Q') => NavKey::Quit,
        _ => return None,
    };
    Some(key)
}

/// Map a mouse event (wheel only)
pub fn map_mouse(event: &MouseEvent) -> Option<NavKey> {
    match event.kind {
        MouseEventKind::ScrollUp => Some(NavKey::Wheel(-WHEEL_STEP)),
        MouseEventKind::ScrollDown => Some(NavKey::Wheel(WHEEL_STEP)),
        _ => None,
    }
}

/// Tracks the state of a single key
#[derive(Debug, Default)]
struct KeyState {
    is_pressed: bool,
    last_triggered: Option<Instant>,
}

/// Turns raw key events into at most one `NavKey` each
#[derive(Debug, Default)]
pub struct InputHandler {
    key_states: HashMap<NavKey, KeyState>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key to act on, or `None` if the event should not trigger
    pub fn translate(&mut self, event: &KeyEvent) -> Option<NavKey> {
        let key = map_key(event)?;
        match event.kind {
            KeyEventKind::Press => self.handle_press(key, Instant::now()).then_some(key),
            KeyEventKind::Repeat => {
                (KeyBehavior::of(key) == KeyBehavior::Repeatable).then_some(key)
            }
            KeyEventKind::Release => {
                self.handle_release(key);
                None
            }
        }
    }

    fn handle_press(&mut self, key: NavKey, now: Instant) -> bool {
        let state = self.key_states.entry(key).or_default();

        if KeyBehavior::of(key) == KeyBehavior::Repeatable {
            state.is_pressed = true;
            state.last_triggered = Some(now);
            return true;
        }

        // Action key still "held" (or the terminal never told us it was released)
        if state.is_pressed {
            if let Some(last) = state.last_triggered {
                if now.duration_since(last) < ACTION_DEBOUNCE {
                    return false;
                }
            }
        }

        state.is_pressed = true;
        state.last_triggered = Some(now);
        true
    }

    fn handle_release(&mut self, key: NavKey) {
        if let Some(state) = self.key_states.get_mut(&key) {
            state.is_pressed = false;
            state.last_triggered = None;
        }
    }
}
