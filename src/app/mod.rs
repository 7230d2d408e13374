//! Interactive editor.
//!
//! - [`Session`]: Buffer, status line and settings of one editing session
//! - [`Message`]: Commands produced by key presses
//! - [`Terminal`]: Key input and frame output
//! - [`App::run`]: Main event loop

mod event_loop;
mod input;
mod session;
mod terminal;

pub use input::{Message, message_for_key};
pub use session::{Control, HELP_MESSAGE, QUIT_TIMES, Session};
pub use terminal::{CrosstermTerminal, Key, Terminal};

use std::path::PathBuf;

use crate::storage::ShardConfig;

/// Main application struct that owns the settings and runs the event loop.
#[derive(Debug)]
pub struct App {
    file_path: Option<PathBuf>,
    dictionary_path: Option<PathBuf>,
    shard_config: ShardConfig,
}

impl App {
    /// Create an application editing `file_path`, or an empty buffer.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            dictionary_path: None,
            shard_config: ShardConfig::default(),
        }
    }

    /// Word list used by profiles that enable spellcheck.
    pub fn with_dictionary(mut self, path: Option<PathBuf>) -> Self {
        self.dictionary_path = path;
        self
    }

    /// Sharding for load, save and render.
    pub const fn with_shard_config(mut self, config: ShardConfig) -> Self {
        self.shard_config = config;
        self
    }
}
