use std::time::Instant;

use anyhow::Result;

use crate::editor::TextBuffer;
use crate::error::EditorError;
use crate::search::{SearchKey, SearchSession};
use crate::storage::ShardConfig;
use crate::ui::{StatusMessage, refresh_screen};

use super::input::{Message, message_for_key};
use super::terminal::{Key, Terminal};

/// Ctrl-Q presses needed to leave with unsaved changes.
pub const QUIT_TIMES: u8 = 3;

pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

/// Whether the event loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Everything one editing session owns.
#[derive(Debug)]
pub struct Session {
    pub buffer: TextBuffer,
    pub status: StatusMessage,
    pub config: ShardConfig,
    quit_times: u8,
}

impl Session {
    pub fn new(buffer: TextBuffer, config: ShardConfig) -> Self {
        Self {
            buffer,
            status: StatusMessage::default(),
            config,
            quit_times: QUIT_TIMES,
        }
    }

    /// Size the text area to a `cols` x `rows` window, leaving two rows for
    /// the status and message bars.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buffer
            .viewport_mut()
            .resize(usize::from(cols), usize::from(rows).saturating_sub(2));
    }

    /// Draw the current state.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be composed or written.
    pub fn refresh<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        let frame = refresh_screen(&mut self.buffer, &self.status, &self.config, Instant::now())?;
        terminal.write(&frame)?;
        Ok(())
    }

    /// Handle one key from the main loop.
    ///
    /// # Errors
    /// Returns an error if the terminal fails during a prompt.
    pub fn process_key<T: Terminal>(&mut self, key: Key, terminal: &mut T) -> Result<Control> {
        let Some(message) = message_for_key(key) else {
            if key != Key::None {
                self.quit_times = QUIT_TIMES;
            }
            return Ok(Control::Continue);
        };
        if message == Message::Quit {
            return Ok(self.quit());
        }
        self.quit_times = QUIT_TIMES;
        self.update(message, terminal)?;
        Ok(Control::Continue)
    }

    fn update<T: Terminal>(&mut self, message: Message, terminal: &mut T) -> Result<()> {
        let buffer = &mut self.buffer;
        match message {
            Message::Insert(byte) => buffer.insert_char_at_cursor(byte),
            Message::Newline => buffer.insert_newline(),
            Message::Backspace => buffer.delete_char_at_cursor(),
            Message::DeleteForward => buffer.delete_forward(),
            Message::Move(direction) => buffer.move_cursor(direction),
            Message::Home => buffer.move_home(),
            Message::End => buffer.move_end(),
            Message::PageUp => buffer.page_up(),
            Message::PageDown => buffer.page_down(),
            Message::Resize(cols, rows) => self.resize(cols, rows),
            Message::Save => self.save(terminal)?,
            Message::Find => self.find(terminal)?,
            Message::Quit => {}
        }
        Ok(())
    }

    fn quit(&mut self) -> Control {
        if self.buffer.is_dirty() && self.quit_times > 0 {
            self.status.set(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_times
            ));
            self.quit_times -= 1;
            return Control::Continue;
        }
        Control::Quit
    }

    fn save<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        if self.buffer.filename().is_none() {
            let Some(name) = self.prompt(terminal, "Save as: {} (ESC to cancel)", |_, _, _| {})?
            else {
                self.status.set("Save aborted");
                return Ok(());
            };
            self.buffer.set_filename(name);
        }
        match self.buffer.save(&self.config) {
            Ok(written) => self.status.set(format!("{written} bytes written to disk")),
            Err(err) => {
                tracing::warn!(error = %err, "save failed");
                let detail = match &err {
                    EditorError::ThreadSpawn(_) => err.to_string(),
                    _ => err.os_description(),
                };
                self.status.set(format!("Can't save! I/O error: {detail}"));
            }
        }
        Ok(())
    }

    fn find<T: Terminal>(&mut self, terminal: &mut T) -> Result<()> {
        let mut search = SearchSession::start(&self.buffer);
        let query = self.prompt(
            terminal,
            "Search: {} (Use ESC/Arrows/Enter)",
            |buffer, query, key| {
                search.step(buffer, query, key);
            },
        )?;
        search.finish(&mut self.buffer, query.is_none());
        Ok(())
    }

    /// Show `label` (with `{}` replaced by the input so far) on the message
    /// line and collect a line of input. `callback` sees every keystroke.
    ///
    /// Returns `None` when the user pressed Esc.
    ///
    /// # Errors
    /// Returns an error if the terminal fails.
    pub fn prompt<T, F>(&mut self, terminal: &mut T, label: &str, mut callback: F) -> Result<Option<String>>
    where
        T: Terminal,
        F: FnMut(&mut TextBuffer, &[u8], SearchKey),
    {
        let mut input = String::new();
        loop {
            self.status.set(label.replacen("{}", &input, 1));
            self.refresh(terminal)?;

            let key = terminal.read_key()?;
            let search_key = match key {
                Key::None => continue,
                Key::Resize(cols, rows) => {
                    self.resize(cols, rows);
                    continue;
                }
                Key::Esc => {
                    self.status.set("");
                    callback(&mut self.buffer, input.as_bytes(), SearchKey::Cancel);
                    return Ok(None);
                }
                Key::Enter if !input.is_empty() => {
                    self.status.set("");
                    callback(&mut self.buffer, input.as_bytes(), SearchKey::Confirm);
                    return Ok(Some(input));
                }
                Key::Backspace | Key::Delete | Key::Ctrl('h') => {
                    input.pop();
                    SearchKey::Edited
                }
                Key::Char(byte) if !byte.is_ascii_control() => {
                    input.push(char::from(byte));
                    SearchKey::Edited
                }
                Key::Right | Key::Down => SearchKey::Next,
                Key::Left | Key::Up => SearchKey::Previous,
                _ => SearchKey::Edited,
            };
            callback(&mut self.buffer, input.as_bytes(), search_key);
        }
    }
}
