//! Terminal output.
//!
//! This module turns a [`crate::editor::TextBuffer`] into escape-coded
//! frames:
//! - [`viewport`]: Scroll position and visible range management
//! - [`render`]: Highlighted text rows and full-frame composition
//! - [`status`]: Status and message bars

pub mod render;
pub mod status;
pub mod viewport;

pub use render::{WELCOME, draw_row, draw_rows, refresh_screen};
pub use status::{MESSAGE_TIMEOUT, StatusMessage, draw_message_bar, draw_status_bar};
