use std::time::Instant;

use crossterm::{cursor, queue};

use crate::editor::{Row, TextBuffer};
use crate::error::EditorError;
use crate::highlight::Highlight;
use crate::perf;
use crate::storage::ShardConfig;

use super::status::{StatusMessage, draw_message_bar, draw_status_bar};
use super::viewport::Viewport;

/// Banner shown on an empty buffer.
pub const WELCOME: &str = concat!("Quill editor -- version ", env!("CARGO_PKG_VERSION"));

const DEFAULT_FG: &[u8] = b"\x1b[39m";
const CLEAR_LINE: &[u8] = b"\x1b[K";
const INVERT: &[u8] = b"\x1b[7m";
const RESET: &[u8] = b"\x1b[m";
const UNDERLINE: &[u8] = b"\x1b[4m";
const NO_UNDERLINE: &[u8] = b"\x1b[24m";

fn push_color(out: &mut Vec<u8>, color: u8) {
    out.extend_from_slice(format!("\x1b[{color}m").as_bytes());
}

/// Draw screen row `screen_y`. `row` is the file row shown there, if any.
pub fn draw_row(row: Option<&Row>, viewport: &Viewport, screen_y: usize, empty_buffer: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(viewport.cols() + 16);
    match row {
        None if empty_buffer && screen_y == viewport.rows() / 3 => {
            let banner = &WELCOME.as_bytes()[..WELCOME.len().min(viewport.cols())];
            let padding = (viewport.cols() - banner.len()) / 2;
            if padding > 0 {
                out.push(b'~');
                out.resize(out.len() + padding - 1, b' ');
            }
            out.extend_from_slice(banner);
        }
        None => out.push(b'~'),
        Some(row) => draw_text(&mut out, row, viewport),
    }
    out.extend_from_slice(DEFAULT_FG);
    out.extend_from_slice(CLEAR_LINE);
    out.extend_from_slice(b"\r\n");
    out
}

fn draw_text(out: &mut Vec<u8>, row: &Row, viewport: &Viewport) {
    let render = row.render();
    let start = viewport.col_offset().min(render.len());
    let end = (start + viewport.cols()).min(render.len());
    let spell = row.spell_errors();

    let mut current: Option<u8> = None;
    let mut underlined = false;
    for j in start..end {
        let byte = render[j];
        let misspelled = spell.is_some_and(|mask| mask[j]);
        if misspelled != underlined {
            out.extend_from_slice(if misspelled { UNDERLINE } else { NO_UNDERLINE });
            underlined = misspelled;
        }

        if byte.is_ascii_control() {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            out.extend_from_slice(INVERT);
            out.push(symbol);
            out.extend_from_slice(RESET);
            if let Some(color) = current {
                push_color(out, color);
            }
            if underlined {
                out.extend_from_slice(UNDERLINE);
            }
            continue;
        }

        match row.highlight()[j] {
            Highlight::Normal => {
                if current.take().is_some() {
                    out.extend_from_slice(DEFAULT_FG);
                }
            }
            class => {
                let color = class.color();
                if current != Some(color) {
                    push_color(out, color);
                    current = Some(color);
                }
            }
        }
        out.push(byte);
    }
    if underlined {
        out.extend_from_slice(NO_UNDERLINE);
    }
}

/// Draw every text row of the screen, one pool task per screen row in
/// parallel mode. Output is always in screen order.
///
/// # Errors
/// Returns [`EditorError::ThreadSpawn`] if a render worker cannot start.
pub fn draw_rows(buffer: &TextBuffer, config: &ShardConfig) -> Result<Vec<u8>, EditorError> {
    let _scope = perf::scope("ui.draw_rows");
    let viewport = buffer.viewport();
    let empty = buffer.row_count() == 0;
    let draw = |screen_y: usize| {
        let row = buffer.row(screen_y + viewport.row_offset());
        draw_row(row, viewport, screen_y, empty)
    };

    let lines = if config.is_parallel() {
        let slots: Vec<usize> = (0..viewport.rows()).collect();
        config.pool("quill-render").map(slots, draw)?
    } else {
        (0..viewport.rows()).map(draw).collect()
    };
    Ok(lines.concat())
}

/// Compose a full frame: text rows, status bar, message bar and cursor.
///
/// Scrolls the viewport to the cursor first.
///
/// # Errors
/// Returns an error if the rows cannot be drawn.
pub fn refresh_screen(
    buffer: &mut TextBuffer,
    message: &StatusMessage,
    config: &ShardConfig,
    now: Instant,
) -> Result<Vec<u8>, EditorError> {
    let rx = buffer.scroll();
    let mut frame = Vec::new();
    queue!(frame, cursor::Hide, cursor::MoveTo(0, 0))?;
    frame.extend(draw_rows(buffer, config)?);
    frame.extend(draw_status_bar(buffer));
    frame.extend(draw_message_bar(message, buffer.viewport().cols(), now));

    let viewport = buffer.viewport();
    let x = to_u16(rx - viewport.col_offset());
    let y = to_u16(buffer.cursor().row - viewport.row_offset());
    queue!(frame, cursor::MoveTo(x, y), cursor::Show)?;
    Ok(frame)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::RowContext;
    use crate::highlight::PROFILES;
    use crate::highlight::spell::WordList;

    fn c_row(text: &str) -> Row {
        let mut row = Row::new(0, text.as_bytes().to_vec());
        row.update(
            RowContext {
                profile: Some(&PROFILES[0]),
                dictionary: None,
            },
            false,
        );
        row
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_plain_row_ends_with_reset_and_clear() {
        let row = c_row("abc");
        let out = draw_row(Some(&row), &Viewport::new(80, 24), 0, false);
        assert_eq!(text(&out), "abc\x1b[39m\x1b[K\r\n");
    }

    #[test]
    fn test_color_changes_only_on_class_change() {
        let row = c_row("int x = 42;");
        let out = text(&draw_row(Some(&row), &Viewport::new(80, 24), 0, false));
        assert_eq!(out, "\x1b[32mint\x1b[39m x = \x1b[31m42\x1b[39m;\x1b[39m\x1b[K\r\n");
    }

    #[test]
    fn test_control_bytes_are_inverted_and_color_restored() {
        let row = c_row("\"a\x01b\"");
        let out = text(&draw_row(Some(&row), &Viewport::new(80, 24), 0, false));
        assert!(out.starts_with("\x1b[35m\"a\x1b[7mA\x1b[m\x1b[35mb\""));
    }

    #[test]
    fn test_row_is_clipped_to_viewport() {
        let row = c_row("abcdefghij");
        let mut vp = Viewport::new(4, 10);
        vp.scroll_to(0, 5);
        let out = text(&draw_row(Some(&row), &vp, 0, false));
        assert!(out.starts_with("cdef\x1b[39m"));
    }

    #[test]
    fn test_filler_and_welcome_banner() {
        let vp = Viewport::new(80, 24);
        assert_eq!(text(&draw_row(None, &vp, 0, true)), "~\x1b[39m\x1b[K\r\n");
        let banner = text(&draw_row(None, &vp, 8, true));
        assert!(banner.starts_with('~'));
        assert!(banner.contains(WELCOME));
        let plain = text(&draw_row(None, &vp, 8, false));
        assert_eq!(plain, "~\x1b[39m\x1b[K\r\n");
    }

    #[test]
    fn test_misspelled_words_are_underlined() {
        let words = WordList::from_words(["good"]);
        let mut row = Row::new(0, b"good bda".to_vec());
        row.update(
            RowContext {
                profile: Some(&PROFILES[1]),
                dictionary: Some(&words),
            },
            false,
        );
        let out = text(&draw_row(Some(&row), &Viewport::new(80, 24), 0, false));
        assert!(out.starts_with("good \x1b[4mbda\x1b[24m"));
    }

    #[test]
    fn test_parallel_rows_match_serial_rows() {
        let lines: Vec<String> = (0..40).map(|i| format!("int v{i} = {i}; /* c */")).collect();
        let mut buf = TextBuffer::from_lines(lines, Some(PROFILES[0]));
        buf.viewport_mut().resize(30, 12);
        let parallel = ShardConfig {
            workers: 4,
            ..ShardConfig::default()
        };
        assert_eq!(
            draw_rows(&buf, &parallel).unwrap(),
            draw_rows(&buf, &ShardConfig::serial()).unwrap()
        );
    }

    #[test]
    fn test_refresh_screen_places_cursor() {
        let mut buf = TextBuffer::from_lines(["\tx"], None);
        buf.viewport_mut().resize(80, 5);
        buf.move_to(0, 1);
        let message = StatusMessage::default();
        let frame = refresh_screen(&mut buf, &message, &ShardConfig::serial(), Instant::now()).unwrap();
        let frame = text(&frame);
        assert!(frame.starts_with("\x1b[?25l"));
        assert!(frame.ends_with("\x1b[1;9H\x1b[?25h"));
    }
}
