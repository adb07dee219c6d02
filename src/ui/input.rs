/// Keyboard → action mapping.
///
/// The game is turn-based: one key press, one action. Only Press events
/// count (terminals that report Release would otherwise move twice).
/// `next_action` waits up to a timeout so the caller can redraw the clock.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::play::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Undo,
    Reset,
    Save,
    Quit,
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('u'), KeyCode::Char('U'), KeyCode::Char('z'), KeyCode::Char('Z'), KeyCode::Backspace];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_SAVE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::F(5)];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

pub const HELP_LINE: &str = "arrows/WASD move  U undo  R reset  P save  Q quit";

/// Map one key event to a game action.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Action::Quit);
    }

    let code = key.code;
    let table: [(&[KeyCode], Action); 8] = [
        (KEYS_LEFT, Action::Move(Direction::Left)),
        (KEYS_RIGHT, Action::Move(Direction::Right)),
        (KEYS_UP, Action::Move(Direction::Up)),
        (KEYS_DOWN, Action::Move(Direction::Down)),
        (KEYS_UNDO, Action::Undo),
        (KEYS_RESET, Action::Reset),
        (KEYS_SAVE, Action::Save),
        (KEYS_QUIT, Action::Quit),
    ];
    table.iter()
        .find(|(keys, _)| keys.contains(&code))
        .map(|(_, action)| *action)
}

/// Wait up to `timeout` for a mapped key. `None` on timeout or an
/// unmapped key.
pub fn next_action(timeout: Duration) -> io::Result<Option<Action>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) => Ok(action_for(key)),
        _ => Ok(None),
    }
}

/// Block until any key is pressed.
pub fn wait_for_key() -> io::Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}
