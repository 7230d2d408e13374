//! Incremental search.
//!
//! Search runs against rendered rows, one keystroke at a time. Each step
//! first undoes the previous match overlay, so at most one row ever carries
//! [`Highlight::Match`] classes. Matches are looked for on the last match
//! row first, then every other row in turn, wrapping around the buffer.

use crate::editor::{Cursor, TextBuffer};
use crate::highlight::Highlight;
use crate::ui::viewport::Viewport;

/// What the user did since the previous step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    /// The query text changed; restart from the top.
    Edited,
    Next,
    Previous,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// A hit, in rendered coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub row: usize,
    pub col: usize,
    pub len: usize,
}

/// Where the previous match was and which way to go next.
#[derive(Debug, Default)]
pub struct SearchState {
    last_row: usize,
    last_col: Option<usize>,
    direction: SearchDirection,
    saved: Option<(usize, Vec<Highlight>)>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Handle one keystroke of an interactive search.
    ///
    /// On a hit the cursor moves to the match, the match is overlaid with
    /// [`Highlight::Match`], and the viewport is pushed so the next scroll
    /// brings the row on screen.
    pub fn step(&mut self, buffer: &mut TextBuffer, query: &[u8], key: SearchKey) -> Option<Match> {
        self.restore_overlay(buffer);
        match key {
            SearchKey::Confirm | SearchKey::Cancel => {
                self.reset();
                return None;
            }
            SearchKey::Next => self.direction = SearchDirection::Forward,
            // Without a previous match there is nothing to step back from.
            SearchKey::Previous if self.last_col.is_none() => {
                self.direction = SearchDirection::Forward;
            }
            SearchKey::Previous => self.direction = SearchDirection::Backward,
            SearchKey::Edited => self.reset(),
        }
        if query.is_empty() || buffer.row_count() == 0 {
            return None;
        }

        let found = self
            .continue_in_row(buffer, query)
            .or_else(|| self.scan(buffer, query))?;
        self.last_row = found.row;
        self.last_col = Some(found.col);
        self.apply(buffer, found);
        Some(found)
    }

    fn reset(&mut self) {
        self.last_row = 0;
        self.last_col = None;
        self.direction = SearchDirection::Forward;
    }

    /// Look again on the last match row, past (or before) the last match.
    fn continue_in_row(&self, buffer: &TextBuffer, query: &[u8]) -> Option<Match> {
        let render = buffer.row(self.last_row)?.render();
        let col = match self.direction {
            SearchDirection::Forward => {
                let start = self.last_col.map_or(0, |col| col + 1);
                if start >= render.len() {
                    return None;
                }
                find(&render[start..], query)? + start
            }
            SearchDirection::Backward => {
                let before = self.last_col?.checked_sub(1)?;
                let end = (before + query.len()).min(render.len());
                rfind(&render[..end], query)?
            }
        };
        Some(Match {
            row: self.last_row,
            col,
            len: query.len(),
        })
    }

    /// Visit every row once, starting next to the last match row.
    fn scan(&self, buffer: &TextBuffer, query: &[u8]) -> Option<Match> {
        let total = buffer.row_count();
        let mut current = self.last_row.min(total - 1);
        for _ in 0..total {
            current = match self.direction {
                SearchDirection::Forward => (current + 1) % total,
                SearchDirection::Backward => (current + total - 1) % total,
            };
            let render = buffer.row(current)?.render();
            let hit = match self.direction {
                SearchDirection::Forward => find(render, query),
                SearchDirection::Backward => rfind(render, query),
            };
            if let Some(col) = hit {
                return Some(Match {
                    row: current,
                    col,
                    len: query.len(),
                });
            }
        }
        None
    }

    fn apply(&mut self, buffer: &mut TextBuffer, found: Match) {
        let Some(row) = buffer.row_mut(found.row) else {
            return;
        };
        let cx = row.rx_to_cx(found.col);
        self.saved = Some((found.row, row.highlight().to_vec()));
        row.highlight_mut()[found.col..found.col + found.len].fill(Highlight::Match);

        let rows = buffer.row_count();
        buffer.move_to(found.row, cx);
        buffer.viewport_mut().push_past_end(rows);
    }

    /// Put back the classes the last overlay replaced.
    fn restore_overlay(&mut self, buffer: &mut TextBuffer) {
        let Some((at, saved)) = self.saved.take() else {
            return;
        };
        if let Some(row) = buffer.row_mut(at)
            && row.highlight().len() == saved.len()
        {
            row.replace_highlight(saved);
        }
    }
}

/// One interactive search, from prompt open to prompt close.
#[derive(Debug)]
pub struct SearchSession {
    state: SearchState,
    cursor: Cursor,
    viewport: Viewport,
}

impl SearchSession {
    /// Remember where the cursor and viewport were.
    pub fn start(buffer: &TextBuffer) -> Self {
        Self {
            state: SearchState::new(),
            cursor: buffer.cursor(),
            viewport: *buffer.viewport(),
        }
    }

    pub fn step(&mut self, buffer: &mut TextBuffer, query: &[u8], key: SearchKey) -> Option<Match> {
        self.state.step(buffer, query, key)
    }

    /// Close the search. A cancelled search puts the cursor and viewport
    /// back where they were.
    pub fn finish(mut self, buffer: &mut TextBuffer, cancelled: bool) {
        let key = if cancelled {
            SearchKey::Cancel
        } else {
            SearchKey::Confirm
        };
        self.state.step(buffer, b"", key);
        if cancelled {
            buffer.restore_view(self.cursor, self.viewport);
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| window == needle)
}
