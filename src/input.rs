//! Keyboard and button input.
//!
//! Arrow keys drive the same entry point as the direction buttons of the web
//! version. While [`RawTerminal`] is alive the terminal is in raw mode on the
//! alternate screen, so arrow presses reach the game and never scroll.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::engine::{Move, ParseMoveError};
use crate::session::Command;

pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(Command::Move(Move::Up)),
        KeyCode::Down => Some(Command::Move(Move::Down)),
        KeyCode::Left => Some(Command::Move(Move::Left)),
        KeyCode::Right => Some(Command::Move(Move::Right)),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Reset),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Block until the next terminal event; `None` for events that map to no command.
pub fn read_command() -> io::Result<Option<Command>> {
    match event::read()? {
        Event::Key(key) => Ok(command_for(&key)),
        _ => Ok(None),
    }
}

/// Parse a list of direction names separated by commas or whitespace.
pub fn parse_script(script: &str) -> Result<Vec<Move>, ParseMoveError> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Raw mode + alternate screen for as long as the guard lives.
pub struct RawTerminal<W: Write> {
    out: W,
}

impl<W: Write> RawTerminal<W> {
    pub fn enter(mut out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self { out })
    }
}

impl<W: Write> Drop for RawTerminal<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
