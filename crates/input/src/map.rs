//! Key mapping from terminal events to game commands.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::cursor::Direction;
use crate::types::Difficulty;

/// What a key press asks the front end to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    MoveCursor(Direction),
    /// Select the tile under the cursor
    Select,
    TogglePause,
    Restart,
    /// Start a new game with the 3-2-1 countdown
    NewGame,
    SetDifficulty(Difficulty),
    ToggleTheme,
    ToggleSound,
}

/// Map keyboard input to a game command.
///
/// Release events are ignored so terminals that report them do not double-fire.
pub fn handle_key_event(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(KeyCommand::MoveCursor(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(KeyCommand::MoveCursor(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(KeyCommand::MoveCursor(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(KeyCommand::MoveCursor(Direction::Down))
        }

        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyCommand::Select),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Some(KeyCommand::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyCommand::Restart),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(KeyCommand::NewGame),

        KeyCode::Char('1') => Some(KeyCommand::SetDifficulty(Difficulty::Easy)),
        KeyCode::Char('2') => Some(KeyCommand::SetDifficulty(Difficulty::Normal)),
        KeyCode::Char('3') => Some(KeyCommand::SetDifficulty(Difficulty::Hard)),

        KeyCode::Char('t') | KeyCode::Char('T') => Some(KeyCommand::ToggleTheme),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(KeyCommand::ToggleSound),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
