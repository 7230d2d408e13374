//! Loading and saving buffers.
//!
//! Both directions come in a sharded flavour, where rows are split into
//! fixed-size shards and handed to a [`WorkerPool`], and a serial flavour.
//! The two produce identical results; [`ShardConfig`] picks one.

mod load;
mod save;

use crate::editor::Row;
use crate::pool::{WorkerPool, available_workers};

pub use load::{load_file, load_parallel, load_serial};
pub use save::{save_file, save_parallel, save_serial};

/// Rows per shard when nothing else is configured.
pub const DEFAULT_SHARD_ROWS: usize = 10_000;

/// Whether bulk operations fan out to worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Parallel,
    Serial,
}

/// How bulk load, save and render split their work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardConfig {
    /// Rows per load/save task.
    pub shard_rows: usize,
    /// Worker threads per batch.
    pub workers: usize,
    pub mode: ExecutionMode,
}

impl ShardConfig {
    /// Single-threaded configuration.
    pub fn serial() -> Self {
        Self {
            mode: ExecutionMode::Serial,
            ..Self::default()
        }
    }

    pub const fn is_parallel(&self) -> bool {
        matches!(self.mode, ExecutionMode::Parallel)
    }

    /// A pool sized for this configuration.
    pub fn pool(&self, name: &'static str) -> WorkerPool {
        WorkerPool::new(name, self.workers)
    }

    pub(crate) fn shard_rows(&self) -> usize {
        self.shard_rows.max(1)
    }
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            shard_rows: DEFAULT_SHARD_ROWS,
            workers: available_workers(),
            mode: ExecutionMode::Parallel,
        }
    }
}

/// Every row's raw bytes followed by a newline.
pub fn serialize_rows(rows: &[Row]) -> Vec<u8> {
    let total = rows.iter().map(|row| row.len() + 1).sum();
    let mut out = Vec::with_capacity(total);
    for row in rows {
        out.extend_from_slice(row.raw());
        out.push(b'\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_appends_newline_per_row() {
        let rows = vec![Row::new(0, b"ab".to_vec()), Row::new(1, Vec::new())];
        assert_eq!(serialize_rows(&rows), b"ab\n\n".to_vec());
        assert!(serialize_rows(&[]).is_empty());
    }

    #[test]
    fn test_serial_config() {
        let config = ShardConfig::serial();
        assert!(!config.is_parallel());
        assert_eq!(config.shard_rows, DEFAULT_SHARD_ROWS);
    }

    #[test]
    fn test_zero_shard_rows_is_clamped() {
        let config = ShardConfig {
            shard_rows: 0,
            ..ShardConfig::default()
        };
        assert_eq!(config.shard_rows(), 1);
        assert!(config.workers >= 1);
    }
}
