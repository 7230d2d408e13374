use crate::editor::Direction;

use super::terminal::Key;

/// Editor commands produced by key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a byte at the cursor
    Insert(u8),
    /// Break the line at the cursor
    Newline,
    /// Delete before the cursor
    Backspace,
    /// Delete under the cursor
    DeleteForward,

    // Navigation
    /// Move the cursor one step
    Move(Direction),
    /// Start of line
    Home,
    /// End of line
    End,
    /// Up one screen
    PageUp,
    /// Down one screen
    PageDown,
    /// Window resized to cols x rows
    Resize(u16, u16),

    // Commands
    /// Write the buffer to disk
    Save,
    /// Open the incremental search prompt
    Find,
    /// Leave the editor
    Quit,
}

/// Translate a key into a command. Keys with no binding map to `None`.
pub const fn message_for_key(key: Key) -> Option<Message> {
    Some(match key {
        Key::Enter => Message::Newline,
        Key::Ctrl('q') => Message::Quit,
        Key::Ctrl('s') => Message::Save,
        Key::Ctrl('f') => Message::Find,
        Key::Backspace | Key::Ctrl('h') => Message::Backspace,
        Key::Delete => Message::DeleteForward,
        Key::Home => Message::Home,
        Key::End => Message::End,
        Key::PageUp => Message::PageUp,
        Key::PageDown => Message::PageDown,
        Key::Up => Message::Move(Direction::Up),
        Key::Down => Message::Move(Direction::Down),
        Key::Left => Message::Move(Direction::Left),
        Key::Right => Message::Move(Direction::Right),
        Key::Resize(cols, rows) => Message::Resize(cols, rows),
        Key::Char(byte) if byte == b'\t' || !byte.is_ascii_control() => Message::Insert(byte),
        Key::Ctrl(_) | Key::Char(_) | Key::Esc | Key::None => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_keys() {
        assert_eq!(message_for_key(Key::Ctrl('q')), Some(Message::Quit));
        assert_eq!(message_for_key(Key::Ctrl('s')), Some(Message::Save));
        assert_eq!(message_for_key(Key::Ctrl('f')), Some(Message::Find));
        assert_eq!(message_for_key(Key::Ctrl('h')), Some(Message::Backspace));
    }

    #[test]
    fn test_ignored_keys() {
        assert_eq!(message_for_key(Key::Ctrl('l')), None);
        assert_eq!(message_for_key(Key::Esc), None);
        assert_eq!(message_for_key(Key::None), None);
        assert_eq!(message_for_key(Key::Char(0x1b)), None);
    }

    #[test]
    fn test_text_keys_insert() {
        assert_eq!(message_for_key(Key::Char(b'x')), Some(Message::Insert(b'x')));
        assert_eq!(message_for_key(Key::Char(b'\t')), Some(Message::Insert(b'\t')));
        assert_eq!(message_for_key(Key::Left), Some(Message::Move(Direction::Left)));
    }
}
