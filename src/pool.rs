//! Bounded per-batch worker pool.
//!
//! A [`WorkerPool`] runs one batch at a time inside a thread scope: workers
//! are started up front, tasks are fed through a bounded channel while the
//! producer is still running, and results come back tagged with the slot
//! they were submitted in. The caller always sees results in submission
//! order, regardless of which worker finished first.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Sender, bounded, unbounded};

use crate::error::EditorError;

/// Tasks queued per worker before the producer blocks.
const QUEUE_DEPTH: usize = 2;

/// Hands tasks to the running workers.
#[derive(Debug)]
pub struct Dispatcher<'a, T> {
    tx: Sender<(usize, T)>,
    cancel: &'a AtomicBool,
    next_slot: usize,
}

impl<T> Dispatcher<'_, T> {
    /// Queue a task. Returns `false` when the batch is cancelled.
    pub fn submit(&mut self, task: T) -> bool {
        if self.cancel.load(Ordering::Relaxed) {
            return false;
        }
        let slot = self.next_slot;
        if self.tx.send((slot, task)).is_err() {
            return false;
        }
        self.next_slot += 1;
        true
    }

    /// Number of tasks queued so far.
    pub const fn submitted(&self) -> usize {
        self.next_slot
    }
}

/// A fixed number of named workers started fresh for each batch.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    workers: usize,
    #[cfg(test)]
    fail_spawn_at: Option<usize>,
}

impl WorkerPool {
    /// A pool of `workers` threads (at least one) named `name-N`.
    pub fn new(name: &'static str, workers: usize) -> Self {
        Self {
            name,
            workers: workers.max(1),
            #[cfg(test)]
            fail_spawn_at: None,
        }
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Make the `index`th spawn fail as if the OS refused a new thread.
    #[cfg(test)]
    pub(crate) const fn failing_spawn_at(mut self, index: usize) -> Self {
        self.fail_spawn_at = Some(index);
        self
    }

    /// Run `tasks` through `work` and return the results in task order.
    ///
    /// # Errors
    /// Returns [`EditorError::ThreadSpawn`] if a worker cannot be started.
    pub fn map<T, R, W>(&self, tasks: Vec<T>, work: W) -> Result<Vec<R>, EditorError>
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
    {
        self.run(work, |dispatch| {
            for task in tasks {
                if !dispatch.submit(task) {
                    break;
                }
            }
            Ok(())
        })
    }

    /// Start the workers, then let `produce` stream tasks to them.
    ///
    /// `produce` only runs once every worker is up, so a spawn failure
    /// cancels the batch before any task exists. If `produce` fails the
    /// remaining queued tasks are skipped and its error is returned.
    ///
    /// # Errors
    /// Returns [`EditorError::ThreadSpawn`] if a worker cannot be started,
    /// or the error returned by `produce`.
    pub fn run<T, R, W, P>(&self, work: W, produce: P) -> Result<Vec<R>, EditorError>
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
        P: FnOnce(&mut Dispatcher<'_, T>) -> Result<(), EditorError>,
    {
        let cancel = AtomicBool::new(false);
        let work = &work;
        let cancel_ref = &cancel;

        thread::scope(|scope| {
            let (task_tx, task_rx) = bounded::<(usize, T)>(self.workers * QUEUE_DEPTH);
            let (result_tx, result_rx) = unbounded::<(usize, R)>();

            for id in 0..self.workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let spawned = self.check_spawn(id).and_then(|()| {
                    thread::Builder::new()
                        .name(format!("{}-{id}", self.name))
                        .spawn_scoped(scope, move || {
                            for (slot, task) in task_rx {
                                if cancel_ref.load(Ordering::Relaxed) {
                                    continue;
                                }
                                if result_tx.send((slot, work(task))).is_err() {
                                    break;
                                }
                            }
                        })
                });
                if let Err(err) = spawned {
                    cancel.store(true, Ordering::Relaxed);
                    tracing::warn!(pool = self.name, worker = id, error = %err, "worker spawn failed, batch cancelled");
                    return Err(EditorError::ThreadSpawn(err));
                }
            }
            drop(task_rx);
            drop(result_tx);
            tracing::debug!(pool = self.name, workers = self.workers, "workers started");

            let mut dispatch = Dispatcher {
                tx: task_tx,
                cancel: cancel_ref,
                next_slot: 0,
            };
            let produced = produce(&mut dispatch);
            let submitted = dispatch.submitted();
            drop(dispatch);
            if let Err(err) = produced {
                cancel.store(true, Ordering::Relaxed);
                return Err(err);
            }

            let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(submitted).collect();
            for (slot, result) in result_rx {
                slots[slot] = Some(result);
            }
            Ok(slots.into_iter().flatten().collect())
        })
    }

    #[cfg(test)]
    fn check_spawn(&self, id: usize) -> io::Result<()> {
        if self.fail_spawn_at == Some(id) {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "Resource temporarily unavailable",
            ));
        }
        Ok(())
    }

    #[cfg(not(test))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    const fn check_spawn(&self, _id: usize) -> io::Result<()> {
        Ok(())
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new("quill-worker", available_workers())
    }
}

/// Number of hardware threads, falling back to one.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_results_follow_submission_order() {
        let pool = WorkerPool::new("test", 4);
        let tasks: Vec<u64> = (0..50).collect();
        let out = pool
            .map(tasks, |n| {
                // Early tasks finish last.
                thread::sleep(Duration::from_micros(50 * (50 - n)));
                n * 2
            })
            .unwrap();
        assert_eq!(out, (0..50).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_batch() {
        let pool = WorkerPool::new("test", 3);
        let out: Vec<u8> = pool.map(Vec::<u8>::new(), |n| n).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_workers_means_one() {
        let pool = WorkerPool::new("test", 0);
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.map(vec![1, 2, 3], |n| n + 1).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_producer_streams_more_tasks_than_queue_depth() {
        let pool = WorkerPool::new("test", 2);
        let out = pool
            .run(
                |n: usize| n * n,
                |dispatch| {
                    for n in 0..100 {
                        dispatch.submit(n);
                    }
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(out.len(), 100);
        assert_eq!(out[99], 99 * 99);
    }

    #[test]
    fn test_spawn_failure_cancels_before_producing() {
        let pool = WorkerPool::new("test", 4).failing_spawn_at(2);
        let produced = AtomicBool::new(false);
        let err = pool
            .run(
                |n: usize| n,
                |dispatch| {
                    produced.store(true, Ordering::Relaxed);
                    dispatch.submit(1);
                    Ok(())
                },
            )
            .unwrap_err();
        assert!(matches!(err, EditorError::ThreadSpawn(_)));
        assert!(!produced.load(Ordering::Relaxed));
    }

    #[test]
    fn test_producer_error_skips_queued_work() {
        let pool = WorkerPool::new("test", 1);
        let ran = AtomicUsize::new(0);
        let err = pool
            .run(
                |_: usize| {
                    ran.fetch_add(1, Ordering::Relaxed);
                },
                |dispatch| {
                    dispatch.submit(0);
                    Err(EditorError::NoFileName)
                },
            )
            .unwrap_err();
        assert!(matches!(err, EditorError::NoFileName));
        assert!(ran.load(Ordering::Relaxed) <= 1);
    }
}
