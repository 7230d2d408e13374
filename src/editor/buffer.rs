use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::EditorError;
use crate::highlight::spell::Dictionary;
use crate::highlight::{SyntaxProfile, select_profile};
use crate::storage::{self, ShardConfig};
use crate::ui::viewport::Viewport;

use super::row::{Row, RowContext};

/// Cursor position in raw (unexpanded) coordinates.
///
/// `row == row_count()` is the virtual empty line after the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The editor's row collection plus cursor, viewport and file metadata.
///
/// Every raw mutation re-renders the touched row and re-highlights it,
/// then keeps going down the buffer while the block-comment state handed
/// to the next row keeps changing.
#[derive(Default)]
pub struct TextBuffer {
    rows: Vec<Row>,
    cursor: Cursor,
    viewport: Viewport,
    dirty: usize,
    filename: Option<PathBuf>,
    syntax: Option<SyntaxProfile>,
    dictionary: Option<Arc<dyn Dictionary>>,
}

impl TextBuffer {
    /// Create an empty buffer with no file attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean buffer from lines, highlighted with `syntax`.
    pub fn from_lines<I, L>(lines: I, syntax: Option<SyntaxProfile>) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let mut buffer = Self {
            syntax,
            ..Self::default()
        };
        buffer.rows = lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| Row::new(idx, line.into()))
            .collect();
        buffer.refresh_all();
        buffer
    }

    // --- Queries ---

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Whether the buffer has unsaved changes.
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// Number of raw mutations since the last load or save.
    pub const fn dirty_count(&self) -> usize {
        self.dirty
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub const fn syntax(&self) -> Option<&SyntaxProfile> {
        self.syntax.as_ref()
    }

    /// Everything rows need to re-derive their state.
    pub fn row_context(&self) -> RowContext<'_> {
        RowContext {
            profile: self.syntax.as_ref(),
            dictionary: self.dictionary.as_deref(),
        }
    }

    /// Serialize every row followed by a newline.
    pub fn to_bytes(&self) -> Vec<u8> {
        storage::serialize_rows(&self.rows)
    }

    // --- File and syntax setup ---

    /// Attach `path`, select its syntax profile and re-highlight.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.syntax = select_profile(&path);
        self.filename = Some(path);
        self.refresh_all();
    }

    pub fn set_syntax(&mut self, syntax: Option<SyntaxProfile>) {
        self.syntax = syntax;
        self.refresh_all();
    }

    /// Attach a dictionary for profiles that enable spellcheck.
    pub fn set_dictionary(&mut self, dictionary: Option<Arc<dyn Dictionary>>) {
        self.dictionary = dictionary;
        self.refresh_all();
    }

    /// Load `path` into the buffer, replacing its rows.
    ///
    /// The buffer is only modified when the whole load succeeds.
    ///
    /// # Errors
    /// Returns [`EditorError::Open`] if the file cannot be opened, or
    /// another error if reading or a worker thread fails.
    pub fn open(&mut self, path: &Path, config: &ShardConfig) -> Result<(), EditorError> {
        self.open_with(path, |path, ctx| storage::load_file(path, ctx, config))
    }

    /// Replace the contents with the rows `load` produces; untouched on error.
    fn open_with<F>(&mut self, path: &Path, load: F) -> Result<(), EditorError>
    where
        F: FnOnce(&Path, RowContext<'_>) -> Result<Vec<Row>, EditorError>,
    {
        let syntax = select_profile(path);
        let ctx = RowContext {
            profile: syntax.as_ref(),
            dictionary: self.dictionary.as_deref(),
        };
        let rows = load(path, ctx)?;
        self.rows = rows;
        self.syntax = syntax;
        self.filename = Some(path.to_path_buf());
        self.cursor = Cursor::default();
        self.dirty = 0;
        Ok(())
    }

    /// Write the buffer to its file name.
    ///
    /// Returns the number of bytes written and clears the dirty flag.
    ///
    /// # Errors
    /// Returns [`EditorError::NoFileName`] when no file name is set, or the
    /// I/O or thread error that aborted the save.
    pub fn save(&mut self, config: &ShardConfig) -> Result<u64, EditorError> {
        let path = self.filename.as_deref().ok_or(EditorError::NoFileName)?;
        let written = storage::save_file(path, &self.rows, config)?;
        self.dirty = 0;
        Ok(written)
    }

    // --- Row operations ---

    /// Insert a row at `at` (clamped to the end of the buffer).
    pub fn insert_row(&mut self, at: usize, text: impl Into<Vec<u8>>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(at, text.into()));
        self.renumber_from(at + 1);
        let (rows, ctx) = self.split_rows();
        rows[at].update_render(ctx);
        // The row after the new one was highlighted against a different
        // predecessor, so it is always recomputed.
        self.rehighlight(at, 2);
        self.dirty += 1;
    }

    /// Delete the row at `at`. Out of range is a no-op.
    pub fn delete_row(&mut self, at: usize) -> bool {
        if at >= self.rows.len() {
            return false;
        }
        self.rows.remove(at);
        self.renumber_from(at);
        self.rehighlight(at, 1);
        self.dirty += 1;
        true
    }

    /// Insert `byte` into row `row` before raw column `col` (clamped).
    pub fn insert_char(&mut self, row: usize, col: usize, byte: u8) -> bool {
        let Some(target) = self.rows.get_mut(row) else {
            return false;
        };
        let col = col.min(target.len());
        target.raw_mut().insert(col, byte);
        self.refresh_row(row);
        self.dirty += 1;
        true
    }

    /// Delete the byte at raw column `col` of row `row`.
    pub fn delete_char(&mut self, row: usize, col: usize) -> bool {
        match self.rows.get_mut(row) {
            Some(target) if col < target.len() => {
                target.raw_mut().remove(col);
            }
            _ => return false,
        }
        self.refresh_row(row);
        self.dirty += 1;
        true
    }

    /// Split `row` at raw column `col`; the tail becomes row `row + 1`.
    pub fn split_line(&mut self, row: usize, col: usize) -> bool {
        let Some(target) = self.rows.get_mut(row) else {
            return false;
        };
        let col = col.min(target.len());
        let tail = target.raw_mut().split_off(col);
        self.insert_row(row + 1, tail);
        self.refresh_row(row);
        true
    }

    /// Append row `row + 1` to `row` and remove it.
    pub fn join_line(&mut self, row: usize) -> bool {
        if row + 1 >= self.rows.len() {
            return false;
        }
        let next = self.rows[row + 1].take_raw();
        self.rows[row].raw_mut().extend_from_slice(&next);
        self.refresh_row(row);
        self.dirty += 1;
        self.delete_row(row + 1);
        true
    }

    // --- Cursor-level editing ---

    /// Type a byte at the cursor.
    pub fn insert_char_at_cursor(&mut self, byte: u8) {
        if self.cursor.row == self.rows.len() {
            self.insert_row(self.rows.len(), Vec::new());
        }
        self.insert_char(self.cursor.row, self.cursor.col, byte);
        self.cursor.col += 1;
    }

    /// Break the line at the cursor (Enter).
    pub fn insert_newline(&mut self) {
        if self.cursor.col == 0 {
            self.insert_row(self.cursor.row, Vec::new());
        } else {
            self.split_line(self.cursor.row, self.cursor.col);
        }
        self.cursor.row += 1;
        self.cursor.col = 0;
    }

    /// Delete the byte before the cursor, joining lines at column 0
    /// (Backspace).
    pub fn delete_char_at_cursor(&mut self) {
        let Cursor { row, col } = self.cursor;
        if row >= self.rows.len() || (row == 0 && col == 0) {
            return;
        }
        if col > 0 {
            self.delete_char(row, col - 1);
            self.cursor.col -= 1;
        } else {
            self.cursor.col = self.rows[row - 1].len();
            self.join_line(row - 1);
            self.cursor.row -= 1;
        }
    }

    /// Delete the byte under the cursor (Delete).
    pub fn delete_forward(&mut self) {
        let before = self.cursor;
        self.move_cursor(Direction::Right);
        if self.cursor != before {
            self.delete_char_at_cursor();
        }
    }

    /// Move the cursor one step, wrapping at line ends.
    pub fn move_cursor(&mut self, direction: Direction) {
        let row_len = self.rows.get(self.cursor.row).map(Row::len);
        match direction {
            Direction::Left => {
                if self.cursor.col > 0 {
                    self.cursor.col -= 1;
                } else if self.cursor.row > 0 {
                    self.cursor.row -= 1;
                    self.cursor.col = self.rows[self.cursor.row].len();
                }
            }
            Direction::Right => {
                if let Some(len) = row_len {
                    if self.cursor.col < len {
                        self.cursor.col += 1;
                    } else {
                        self.cursor.row += 1;
                        self.cursor.col = 0;
                    }
                }
            }
            Direction::Up => {
                self.cursor.row = self.cursor.row.saturating_sub(1);
            }
            Direction::Down => {
                if self.cursor.row < self.rows.len() {
                    self.cursor.row += 1;
                }
            }
        }
        self.clamp_cursor_col();
    }

    /// Move to column 0 (Home).
    pub const fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    /// Move to the end of the current row (End).
    pub fn move_end(&mut self) {
        if let Some(row) = self.rows.get(self.cursor.row) {
            self.cursor.col = row.len();
        }
    }

    /// Jump a screen up: first to the top of the screen, then a screen
    /// further.
    pub fn page_up(&mut self) {
        self.cursor.row = self.viewport.row_offset();
        for _ in 0..self.viewport.rows() {
            self.move_cursor(Direction::Up);
        }
    }

    /// Jump a screen down: first to the bottom of the screen, then a screen
    /// further.
    pub fn page_down(&mut self) {
        let bottom = (self.viewport.row_offset() + self.viewport.rows()).saturating_sub(1);
        self.cursor.row = bottom.min(self.rows.len());
        for _ in 0..self.viewport.rows() {
            self.move_cursor(Direction::Down);
        }
    }

    /// Place the cursor, clamping both coordinates.
    pub fn move_to(&mut self, row: usize, col: usize) {
        self.cursor.row = row.min(self.rows.len());
        self.cursor.col = col;
        self.clamp_cursor_col();
    }

    /// Rendered column of the cursor.
    pub fn cursor_rx(&self) -> usize {
        self.rows
            .get(self.cursor.row)
            .map_or(0, |row| row.cx_to_rx(self.cursor.col))
    }

    /// Scroll the viewport so the cursor is visible. Returns the cursor's
    /// rendered column.
    pub fn scroll(&mut self) -> usize {
        let rx = self.cursor_rx();
        self.viewport.scroll_to(self.cursor.row, rx);
        rx
    }

    /// Replace cursor and viewport wholesale (search cancel).
    pub(crate) const fn restore_view(&mut self, cursor: Cursor, viewport: Viewport) {
        self.cursor = cursor;
        self.viewport = viewport;
    }

    pub(crate) fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    // --- Derived state maintenance ---

    /// Re-highlight starting at `start`, recomputing at least `forced` rows
    /// and then following the block-comment state down the buffer.
    pub fn rehighlight(&mut self, start: usize, forced: usize) -> usize {
        let (rows, ctx) = self.split_rows();
        cascade(rows, ctx, start, forced)
    }

    fn refresh_row(&mut self, at: usize) {
        let (rows, ctx) = self.split_rows();
        rows[at].update_render(ctx);
        self.rehighlight(at, 1);
    }

    /// Re-render and re-highlight every row, top to bottom.
    fn refresh_all(&mut self) {
        let (rows, ctx) = self.split_rows();
        let mut entering = false;
        for row in rows {
            row.update(ctx, entering);
            entering = row.open_comment();
        }
    }

    /// Rows borrowed mutably alongside the context that derives them.
    fn split_rows(&mut self) -> (&mut [Row], RowContext<'_>) {
        let ctx = RowContext {
            profile: self.syntax.as_ref(),
            dictionary: self.dictionary.as_deref(),
        };
        (&mut self.rows, ctx)
    }

    fn renumber_from(&mut self, start: usize) {
        for (idx, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.set_idx(idx);
        }
    }

    fn clamp_cursor_col(&mut self) {
        let len = self.rows.get(self.cursor.row).map_or(0, Row::len);
        self.cursor.col = self.cursor.col.min(len);
    }
}

/// Re-highlight `rows` starting at `start`. The first `forced` rows are
/// always recomputed; after that the walk continues only while a row's exit
/// comment state changed. Returns the last row touched.
pub(crate) fn cascade(rows: &mut [Row], ctx: RowContext<'_>, start: usize, forced: usize) -> usize {
    let mut at = start;
    let mut remaining = forced;
    let mut last = start;
    while at < rows.len() {
        let entering = at > 0 && rows[at - 1].open_comment();
        let changed = rows[at].update_highlight(ctx, entering);
        last = at;
        remaining = remaining.saturating_sub(1);
        if !changed && remaining == 0 {
            break;
        }
        at += 1;
    }
    last
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("rows", &format_args!("{} rows", self.rows.len()))
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("filename", &self.filename)
            .field("syntax", &self.syntax.map(|s| s.file_type))
            .finish_non_exhaustive()
    }
}
