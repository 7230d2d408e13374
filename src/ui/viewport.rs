//! Viewport management for scrolling.
//!
//! The [`Viewport`] tracks which part of the buffer is on screen: the top
//! file row, the left rendered column, and the size of the text area.

use std::ops::Range;

/// The visible window onto the buffer.
///
/// # Example
///
/// ```
/// use quill::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 22);
/// vp.scroll_to(30, 0);
/// assert_eq!(vp.row_offset(), 9);
/// assert_eq!(vp.visible_rows(100), 9..31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cols: usize,
    rows: usize,
    row_offset: usize,
    col_offset: usize,
}

impl Viewport {
    /// Create a viewport for a text area of `cols` x `rows` cells.
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            row_offset: 0,
            col_offset: 0,
        }
    }

    /// First file row on screen.
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First rendered column on screen.
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Number of text rows (status and message bars excluded).
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// File rows currently on screen, clamped to `total_rows`.
    pub fn visible_rows(&self, total_rows: usize) -> Range<usize> {
        let start = self.row_offset.min(total_rows);
        let end = (self.row_offset + self.rows).min(total_rows);
        start..end
    }

    /// Adjust the offsets so that file row `cy`, rendered column `rx` is
    /// on screen.
    pub const fn scroll_to(&mut self, cy: usize, rx: usize) {
        if cy < self.row_offset {
            self.row_offset = cy;
        }
        if self.rows > 0 && cy >= self.row_offset + self.rows {
            self.row_offset = cy + 1 - self.rows;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if self.cols > 0 && rx >= self.col_offset + self.cols {
            self.col_offset = rx + 1 - self.cols;
        }
    }

    /// Push the top row past `row_count` so the next scroll brings the
    /// cursor row to the top of the screen.
    pub const fn push_past_end(&mut self, row_count: usize) {
        self.row_offset = row_count;
    }

    /// Resize the text area.
    pub const fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 22)
    }
}
