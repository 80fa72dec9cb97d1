//! Batch distribution for parallel simulation.
//!
//! Splits autoplay iterations into batches for parallel execution or
//! progress reporting.

use std::sync::Arc;

use crate::data::catalog::Catalog;
use crate::game::save::GameSnapshot;
use crate::optimizer::monte_carlo::{run_autoplay_range, summarize, AutoplaySummary};
use crate::parallel::pool::WorkerPool;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use escouade::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Runs autoplay iterations in batches on `pool`, in iteration order.
/// Results equal those of [crate::optimizer::monte_carlo::run_autoplay] for the same seed.
pub fn run_autoplay_batches(
    catalog: &Arc<Catalog>,
    template: &GameSnapshot,
    iterations: usize,
    seed: u64,
    num_batches: usize,
    pool: &WorkerPool,
) -> AutoplaySummary {
    pool.install(|| {
        let mut runs = Vec::with_capacity(iterations);
        for (start, end) in batch_ranges(iterations, num_batches.max(1)) {
            runs.extend(run_autoplay_range(catalog, template, seed, start, end));
        }
        summarize(&runs, iterations, seed)
    })
}
