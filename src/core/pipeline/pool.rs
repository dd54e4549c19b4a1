//! Fixed-size worker pool running one batch at a time.

use crate::error::DuplicateFinderError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Worker count matching the available hardware parallelism
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Dedicated rayon pool for the pooled stages
///
/// Each worker blocks on external tool calls, so the pool is kept
/// separate from rayon's global pool.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, DuplicateFinderError> {
        if workers == 0 {
            return Err(DuplicateFinderError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dedupe-worker-{i}"))
            .build()
            .map_err(|e| DuplicateFinderError::Config(format!("cannot start worker pool: {e}")))?;

        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task` over every item and wait for all of them.
    ///
    /// The first error aborts the batch; no partial results are returned.
    /// Result order follows `items`, but callers must not rely on the
    /// order in which tasks ran.
    pub fn run_batch<T, R, E, F>(&self, items: &[T], task: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(task).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_workers_is_a_config_error() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(DuplicateFinderError::Config(_))
        ));
    }

    #[test]
    fn pool_uses_requested_workers() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.workers(), 3);
    }

    #[test]
    fn batch_collects_all_results() {
        let pool = WorkerPool::new(4).unwrap();
        let items: Vec<u32> = (0..100).collect();

        let results: Vec<u32> = pool
            .run_batch(&items, |n| Ok::<_, String>(n * 2))
            .unwrap();

        assert_eq!(results.len(), 100);
        assert_eq!(results.iter().sum::<u32>(), 2 * items.iter().sum::<u32>());
    }

    #[test]
    fn single_failure_aborts_batch() {
        let pool = WorkerPool::new(4).unwrap();
        let items: Vec<u32> = (0..50).collect();
        let ran = AtomicUsize::new(0);

        let result = pool.run_batch(&items, |n| {
            ran.fetch_add(1, Ordering::SeqCst);
            if *n == 17 {
                Err(format!("task {n} failed"))
            } else {
                Ok(*n)
            }
        });

        assert_eq!(result.unwrap_err(), "task 17 failed");
        assert!(ran.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn empty_batch_is_ok() {
        let pool = WorkerPool::new(2).unwrap();
        let results: Vec<u32> = pool.run_batch(&[], |n: &u32| Ok::<_, ()>(*n)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }
}
