use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::ops::Range;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::editor::{Row, RowContext, cascade};
use crate::error::EditorError;
use crate::perf;
use crate::pool::WorkerPool;

use super::{ExecutionMode, ShardConfig};

/// Rows `range` of the arena, highlighted as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTask {
    pub range: Range<usize>,
}

/// Growable row storage shared between the reader and the shard workers.
///
/// The outer write lock is only taken to append. Workers hold the read
/// lock just long enough to move a row out or back in, so the reader can
/// keep appending while shards are being highlighted.
#[derive(Debug, Default)]
struct RowArena {
    slots: RwLock<Vec<Mutex<Row>>>,
}

impl RowArena {
    /// Append a row and return the new row count.
    fn push(&self, raw: Vec<u8>) -> usize {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let idx = slots.len();
        slots.push(Mutex::new(Row::new(idx, raw)));
        slots.len()
    }

    fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn take(&self, idx: usize) -> Row {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut slot = slots[idx].lock().unwrap_or_else(PoisonError::into_inner);
        mem::take(&mut *slot)
    }

    fn publish(&self, row: Row) {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let idx = row.idx();
        *slots[idx].lock().unwrap_or_else(PoisonError::into_inner) = row;
    }

    /// Derive every row in the shard. The first row assumes no block
    /// comment is open; the boundary fix-up corrects that afterwards.
    fn highlight_shard(&self, task: &ShardTask, ctx: RowContext<'_>) {
        let mut entering = false;
        for idx in task.range.clone() {
            let mut row = self.take(idx);
            row.update(ctx, entering);
            entering = row.open_comment();
            self.publish(row);
        }
    }

    fn into_rows(self) -> Vec<Row> {
        self.slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

/// Load `path` according to `config`.
///
/// # Errors
/// Returns [`EditorError::Open`] if the file cannot be opened,
/// [`EditorError::Io`] on a read failure and [`EditorError::ThreadSpawn`]
/// if a worker cannot be started.
pub fn load_file(
    path: &Path,
    ctx: RowContext<'_>,
    config: &ShardConfig,
) -> Result<Vec<Row>, EditorError> {
    match config.mode {
        ExecutionMode::Parallel => {
            load_parallel(path, ctx, config.shard_rows(), &config.pool("quill-load"))
        }
        ExecutionMode::Serial => load_serial(path, ctx),
    }
}

/// Read and highlight every row on the calling thread.
///
/// # Errors
/// See [`load_file`].
pub fn load_serial(path: &Path, ctx: RowContext<'_>) -> Result<Vec<Row>, EditorError> {
    let _scope = perf::scope("storage.load_serial");
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    let mut entering = false;
    while let Some(raw) = read_line(&mut reader)? {
        let mut row = Row::new(rows.len(), raw);
        row.update(ctx, entering);
        entering = row.open_comment();
        rows.push(row);
    }
    tracing::info!(path = %path.display(), rows = rows.len(), "loaded");
    Ok(rows)
}

/// Read rows on the calling thread while `pool` highlights completed
/// shards of `shard_rows` rows.
///
/// # Errors
/// See [`load_file`].
pub fn load_parallel(
    path: &Path,
    ctx: RowContext<'_>,
    shard_rows: usize,
    pool: &WorkerPool,
) -> Result<Vec<Row>, EditorError> {
    let _scope = perf::scope("storage.load_parallel");
    let shard_rows = shard_rows.max(1);
    let mut reader = open(path)?;
    let arena = RowArena::default();

    pool.run(
        |task: ShardTask| arena.highlight_shard(&task, ctx),
        |dispatch| {
            let mut shard_start = 0;
            while let Some(raw) = read_line(&mut reader)? {
                let len = arena.push(raw);
                if len - shard_start == shard_rows {
                    tracing::debug!(start = shard_start, end = len, "dispatch load shard");
                    dispatch.submit(ShardTask {
                        range: shard_start..len,
                    });
                    shard_start = len;
                }
            }
            let len = arena.len();
            if shard_start < len {
                tracing::debug!(start = shard_start, end = len, "dispatch load shard");
                dispatch.submit(ShardTask {
                    range: shard_start..len,
                });
            }
            Ok(())
        },
    )?;

    let mut rows = arena.into_rows();
    let fixed = fix_shard_boundaries(&mut rows, ctx, shard_rows);
    tracing::info!(
        path = %path.display(),
        rows = rows.len(),
        shards = rows.len().div_ceil(shard_rows),
        boundaries_fixed = fixed,
        "loaded"
    );
    Ok(rows)
}

/// Re-run the cascade at every shard start whose predecessor leaves a
/// block comment open. Returns the number of boundaries that needed it.
fn fix_shard_boundaries(rows: &mut [Row], ctx: RowContext<'_>, shard_rows: usize) -> usize {
    let mut fixed = 0;
    for start in (shard_rows..rows.len()).step_by(shard_rows) {
        if rows[start - 1].open_comment() {
            cascade(rows, ctx, start, 1);
            fixed += 1;
        }
    }
    fixed
}

fn open(path: &Path) -> Result<BufReader<File>, EditorError> {
    let file = File::open(path).map_err(|source| EditorError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Next line without its trailing `\r`/`\n` bytes, or `None` at EOF.
fn read_line(reader: &mut impl BufRead) -> std::io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
    Ok(Some(line))
}
