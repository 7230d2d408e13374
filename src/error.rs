//! Error types shared by the buffer, storage and worker pool layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by buffer-level operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The file handed to `open` could not be opened for reading.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A read or write failed part way through a load or save.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A worker thread could not be started; the batch was cancelled.
    #[error("failed to start worker thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    /// Save was requested on a buffer that has no file name yet.
    #[error("no file name")]
    NoFileName,
}

impl EditorError {
    /// Whether the error should abort the editor rather than be shown
    /// on the status line.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// The OS-provided description, without our own prefix.
    pub fn os_description(&self) -> String {
        match self {
            Self::Open { source, .. } | Self::Io(source) | Self::ThreadSpawn(source) => {
                source.to_string()
            }
            Self::NoFileName => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_fatal_and_io_is_not() {
        let open = EditorError::Open {
            path: PathBuf::from("missing.c"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(open.is_fatal());
        assert!(open.to_string().contains("missing.c"));

        let io_err = EditorError::Io(io::Error::other("disk full"));
        assert!(!io_err.is_fatal());
        assert_eq!(io_err.os_description(), "disk full");
    }

    #[test]
    fn test_no_file_name_description() {
        assert_eq!(EditorError::NoFileName.os_description(), "no file name");
    }
}
