//! Rayon helpers for revaluation fan-out.
//!
//! Every Monte Carlo path and every scenario revaluation is independent and
//! reads only shared, immutable market data and instruments. These helpers
//! switch between a plain iterator and a rayon parallel iterator depending on
//! the amount of work, and keep the output in input order either way.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimum number of items a rayon task is given.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Item count from which work is spread over the thread pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100;

/// Configuration for parallel execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum items per rayon task
    pub batch_size: usize,
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, usize::MAX)
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }

    /// Maps `f` over `items`, stopping at a failure.
    ///
    /// When several items fail in parallel mode, which error is returned is
    /// unspecified.
    pub fn try_map<T, R, E, F>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        if self.should_parallelize(items.len()) {
            items
                .par_iter()
                .with_min_len(self.batch_size.max(1))
                .map(f)
                .collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    /// Maps `f` over the indices `0..n`, stopping at a failure.
    pub fn try_map_indices<R, E, F>(&self, n: usize, f: F) -> Result<Vec<R>, E>
    where
        R: Send,
        E: Send,
        F: Fn(usize) -> Result<R, E> + Sync + Send,
    {
        if self.should_parallelize(n) {
            (0..n)
                .into_par_iter()
                .with_min_len(self.batch_size.max(1))
                .map(f)
                .collect()
        } else {
            (0..n).map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.parallel_threshold, 100);
    }

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::default();
        assert!(!config.should_parallelize(50));
        assert!(config.should_parallelize(100));
        assert!(!ParallelConfig::sequential().should_parallelize(1_000_000));
    }

    #[test]
    fn test_try_map_keeps_order_in_both_modes() {
        let items: Vec<i64> = (0..500).collect();
        let parallel = ParallelConfig::new(8, 10)
            .try_map(&items, |&x| Ok::<_, ()>(x * 2))
            .unwrap();
        let sequential = ParallelConfig::sequential()
            .try_map(&items, |&x| Ok::<_, ()>(x * 2))
            .unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel[250], 500);
    }

    #[test]
    fn test_try_map_indices_propagates_failure() {
        let result = ParallelConfig::new(1, 0).try_map_indices(200, |i| {
            if i == 123 {
                Err(format!("path {}", i))
            } else {
                Ok(i)
            }
        });
        assert_eq!(result, Err("path 123".to_string()));
    }
}
