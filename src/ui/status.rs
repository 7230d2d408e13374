use std::time::{Duration, Instant};

use crate::editor::TextBuffer;

/// How long a status message stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest file name prefix shown in the status bar, in bytes.
const NAME_WIDTH: usize = 20;

/// The transient message under the status bar.
#[derive(Debug, Clone, Default)]
pub struct StatusMessage {
    text: String,
    set_at: Option<Instant>,
}

impl StatusMessage {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Some(Instant::now());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message, if it was set less than [`MESSAGE_TIMEOUT`] before `now`.
    pub fn visible(&self, now: Instant) -> Option<&str> {
        let set_at = self.set_at?;
        (!self.text.is_empty() && now.saturating_duration_since(set_at) < MESSAGE_TIMEOUT)
            .then_some(self.text.as_str())
    }
}

/// Inverted bar with file name, line count, dirty marker on the left and
/// file type plus cursor line on the right.
pub fn draw_status_bar(buffer: &TextBuffer) -> Vec<u8> {
    let cols = buffer.viewport().cols();
    let name = buffer
        .filename()
        .map_or_else(|| "[No Name]".to_string(), |path| path.display().to_string());
    let name = &name.as_bytes()[..name.len().min(NAME_WIDTH)];

    let mut left = name.to_vec();
    left.extend_from_slice(
        format!(
            " - {} lines {}",
            buffer.row_count(),
            if buffer.is_dirty() { "(modified)" } else { "" }
        )
        .as_bytes(),
    );
    let right = format!(
        "{} | {}/{}",
        buffer.syntax().map_or("no ft", |syntax| syntax.file_type),
        buffer.cursor().row + 1,
        buffer.row_count()
    );

    let mut out = b"\x1b[7m".to_vec();
    let mut len = left.len().min(cols);
    out.extend_from_slice(&left[..len]);
    while len < cols {
        if cols - len == right.len() {
            out.extend_from_slice(right.as_bytes());
            break;
        }
        out.push(b' ');
        len += 1;
    }
    out.extend_from_slice(b"\x1b[m\r\n");
    out
}

/// The message line, cleared and clipped to `cols`.
pub fn draw_message_bar(message: &StatusMessage, cols: usize, now: Instant) -> Vec<u8> {
    let mut out = b"\x1b[K".to_vec();
    if let Some(text) = message.visible(now) {
        out.extend_from_slice(&text.as_bytes()[..text.len().min(cols)]);
    }
    out
}
