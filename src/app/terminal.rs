//! Terminal access behind a small trait so the session can be driven by a
//! scripted terminal in tests.

use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// How long `read_key` waits before reporting [`Key::None`].
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable byte (or tab).
    Char(u8),
    /// Ctrl plus a lowercase letter.
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// The window changed to `cols` x `rows`.
    Resize(u16, u16),
    /// Nothing arrived before the poll timeout.
    None,
}

pub trait Terminal {
    /// Wait briefly for the next key.
    fn read_key(&mut self) -> io::Result<Key>;

    /// Current size as `(cols, rows)`.
    fn window_size(&self) -> io::Result<(u16, u16)>;

    /// Write one complete frame.
    fn write(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// Restores cooked mode when dropped.
#[derive(Debug)]
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// The real terminal, in raw mode for as long as this value lives.
#[derive(Debug)]
pub struct CrosstermTerminal {
    out: Stdout,
    _raw: RawModeGuard,
}

impl CrosstermTerminal {
    /// Switch the terminal to raw mode.
    ///
    /// # Errors
    /// Returns an error if raw mode cannot be enabled.
    pub fn new() -> io::Result<Self> {
        let raw = RawModeGuard::enable()?;
        Ok(Self {
            out: stdout(),
            _raw: raw,
        })
    }
}

impl Terminal for CrosstermTerminal {
    fn read_key(&mut self) -> io::Result<Key> {
        if !event::poll(POLL_TIMEOUT)? {
            return Ok(Key::None);
        }
        Ok(match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => decode_key(key),
            Event::Resize(cols, rows) => Key::Resize(cols, rows),
            _ => Key::None,
        })
    }

    fn window_size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        self.out.write_all(frame)?;
        self.out.flush()
    }
}

fn decode_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .map_or(Key::None, Key::Char),
        KeyCode::Tab => Key::Char(b'\t'),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => Key::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ctrl_and_printable() {
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(decode_key(ctrl_q), Key::Ctrl('q'));
        let a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(decode_key(a), Key::Char(b'a'));
        let upper = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(decode_key(upper), Key::Char(b'A'));
    }

    #[test]
    fn test_decode_non_ascii_is_ignored() {
        let key = KeyEvent::new(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(decode_key(key), Key::None);
    }

    #[test]
    fn test_decode_navigation() {
        let key = KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(decode_key(key), Key::PageDown);
        let key = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(decode_key(key), Key::Char(b'\t'));
    }
}
