use std::sync::Arc;

use anyhow::{Context, Result};

use crate::editor::TextBuffer;
use crate::highlight::spell::{Dictionary, WordList};

use super::App;
use super::session::{Control, HELP_MESSAGE, Session};
use super::terminal::{CrosstermTerminal, Terminal};

/// Clear the screen and home the cursor.
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

impl App {
    /// Load the file, take over the terminal and run until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the dictionary or file cannot be loaded, or the
    /// terminal fails.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");
        let session = self.prepare_session()?;

        let mut terminal = CrosstermTerminal::new()
            .context("Failed to initialize terminal; quill requires an interactive terminal")?;
        let result = Self::event_loop(session, &mut terminal);
        let _ = terminal.write(CLEAR_SCREEN);
        result
    }

    /// Build the session: dictionary, buffer contents and status line.
    pub(super) fn prepare_session(&self) -> Result<Session> {
        let mut buffer = TextBuffer::new();
        if let Some(path) = &self.dictionary_path {
            let words = WordList::load(path)
                .with_context(|| format!("Failed to load dictionary {}", path.display()))?;
            let dictionary: Arc<dyn Dictionary> = Arc::new(words);
            buffer.set_dictionary(Some(dictionary));
        }
        if let Some(path) = &self.file_path {
            let load_scope = crate::perf::scope("app.load_file");
            buffer
                .open(path, &self.shard_config)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            drop(load_scope);
        }
        let mut session = Session::new(buffer, self.shard_config);
        session.status.set(HELP_MESSAGE);
        Ok(session)
    }

    fn event_loop<T: Terminal>(mut session: Session, terminal: &mut T) -> Result<()> {
        let (cols, rows) = terminal
            .window_size()
            .context("Failed to query window size")?;
        session.resize(cols, rows);
        tracing::info!(cols, rows, "editor started");

        loop {
            session.refresh(terminal)?;
            let key = terminal.read_key()?;
            if session.process_key(key, terminal)? == Control::Quit {
                tracing::info!("editor quit");
                return Ok(());
            }
        }
    }
}
