use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::editor::Row;
use crate::error::EditorError;
use crate::perf;
use crate::pool::WorkerPool;

use super::{ExecutionMode, ShardConfig, serialize_rows};

/// Rows `range`, written as `len` bytes starting at file offset `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTask {
    pub range: Range<usize>,
    pub offset: u64,
    pub len: u64,
}

/// Save `rows` to `path` according to `config`. Returns the bytes written.
///
/// # Errors
/// Returns [`EditorError::Io`] if the file cannot be opened, truncated or
/// written, and [`EditorError::ThreadSpawn`] if a worker cannot be started.
pub fn save_file(path: &Path, rows: &[Row], config: &ShardConfig) -> Result<u64, EditorError> {
    match config.mode {
        ExecutionMode::Parallel => {
            save_parallel(path, rows, config.shard_rows(), &config.pool("quill-save"))
        }
        ExecutionMode::Serial => save_serial(path, rows),
    }
}

/// Serialize and write the whole buffer on the calling thread.
///
/// # Errors
/// See [`save_file`].
pub fn save_serial(path: &Path, rows: &[Row]) -> Result<u64, EditorError> {
    let _scope = perf::scope("storage.save_serial");
    let bytes = serialize_rows(rows);
    let total = bytes.len() as u64;
    let mut file = open(path)?;
    file.set_len(total)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&bytes)?;
    tracing::info!(path = %path.display(), rows = rows.len(), bytes = total, "saved");
    Ok(total)
}

/// Write shards of `shard_rows` rows concurrently at precomputed offsets.
///
/// The file is opened and truncated to its final length only after every
/// worker has started, so a spawn failure leaves the path as it was.
///
/// # Errors
/// See [`save_file`].
pub fn save_parallel(
    path: &Path,
    rows: &[Row],
    shard_rows: usize,
    pool: &WorkerPool,
) -> Result<u64, EditorError> {
    let _scope = perf::scope("storage.save_parallel");
    let shard_rows = shard_rows.max(1);
    let offsets = row_offsets(rows);
    let total = offsets[rows.len()];
    let file: OnceLock<Mutex<File>> = OnceLock::new();

    let written = pool.run(
        |task: SaveTask| write_shard(&file, rows, &task),
        |dispatch| {
            let opened = open(path)?;
            opened.set_len(total)?;
            // Workers only see tasks submitted below, after this is set.
            let _ = file.set(Mutex::new(opened));
            for start in (0..rows.len()).step_by(shard_rows) {
                let end = (start + shard_rows).min(rows.len());
                tracing::debug!(start, end, offset = offsets[start], "dispatch save shard");
                dispatch.submit(SaveTask {
                    range: start..end,
                    offset: offsets[start],
                    len: offsets[end] - offsets[start],
                });
            }
            Ok(())
        },
    )?;
    written.into_iter().collect::<io::Result<()>>()?;

    tracing::info!(path = %path.display(), rows = rows.len(), bytes = total, "saved");
    Ok(total)
}

/// File offset of every row, plus the total length as the last entry.
fn row_offsets(rows: &[Row]) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(rows.len() + 1);
    let mut offset = 0u64;
    offsets.push(offset);
    for row in rows {
        offset += row.len() as u64 + 1;
        offsets.push(offset);
    }
    offsets
}

fn write_shard(file: &OnceLock<Mutex<File>>, rows: &[Row], task: &SaveTask) -> io::Result<()> {
    let Some(file) = file.get() else {
        return Err(io::Error::other("save target not opened"));
    };
    let bytes = serialize_rows(&rows[task.range.clone()]);
    debug_assert_eq!(bytes.len() as u64, task.len);
    let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
    file.seek(SeekFrom::Start(task.offset))?;
    file.write_all(&bytes)
}

fn open(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)
}
