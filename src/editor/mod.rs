//! Row-based text buffer.
//!
//! Each [`Row`] keeps its raw bytes next to the derived render, highlight
//! and spell state. [`TextBuffer`] owns the rows and keeps that derived
//! state current across edits, including block comments that span rows.

mod buffer;
mod row;

pub(crate) use buffer::cascade;
pub use buffer::{Cursor, Direction, TextBuffer};
pub use row::{Row, RowContext, TAB_STOP, cx_to_rx, render, rx_to_cx};
