// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::TextBuffer)
    clippy::module_name_repetitions
)]

//! # Quill
//!
//! A small terminal text editor.
//!
//! Quill keeps a file as a vector of rows, each with its raw bytes, a
//! tab-expanded rendering and a syntax class per rendered byte:
//! - Incremental highlighting with block comments cascading across rows
//! - Incremental forward/backward search with wraparound
//! - Sharded multi-threaded load, save and screen rendering
//! - Optional spellchecking of plain text files
//!
//! ## Modules
//!
//! - [`editor`]: Rows and the text buffer
//! - [`highlight`]: Syntax profiles, the highlighter and spellcheck
//! - [`search`]: Incremental search
//! - [`pool`]: Per-batch worker pool
//! - [`storage`]: Sharded and serial load/save
//! - [`ui`]: Escape-coded frame rendering
//! - [`app`]: Terminal session and event loop

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod perf;
pub mod pool;
pub mod search;
pub mod storage;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{Cursor, Direction, Row, TextBuffer};
    pub use crate::error::EditorError;
    pub use crate::highlight::{Highlight, SyntaxProfile};
    pub use crate::storage::{ExecutionMode, ShardConfig};
    pub use crate::ui::viewport::Viewport;
}
