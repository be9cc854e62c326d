//! Key mapping from terminal events to game actions.

use std::io;
use std::time::Duration;

use crate::types::GameAction;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to game actions.
///
/// Only key presses count; repeats and releases (on terminals that report
/// them) map to nothing.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if should_quit(key) {
        return Some(GameAction::Leave);
    }

    match key.code {
        // Aim
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(GameAction::AimLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(GameAction::AimRight),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(GameAction::AimUp),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(GameAction::AimDown),

        KeyCode::Enter | KeyCode::Char('x') | KeyCode::Char('X') => Some(GameAction::Place),

        // Rotation
        KeyCode::Char('q')
        | KeyCode::Char('Q')
        | KeyCode::Char('z')
        | KeyCode::Char('Z')
        | KeyCode::Char('[') => Some(GameAction::RotateCcw),
        KeyCode::Char('e')
        | KeyCode::Char('E')
        | KeyCode::Char('c')
        | KeyCode::Char('C')
        | KeyCode::Char(']') => Some(GameAction::RotateCw),

        KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Swap),

        _ => None,
    }
}

/// Check if key should leave the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Wait up to `timeout` for a terminal key press and map it.
///
/// Returns `Ok(None)` on timeout or for unmapped input.
pub fn read_action(timeout: Duration) -> io::Result<Option<GameAction>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) => Ok(handle_key_event(key)),
        _ => Ok(None),
    }
}
