//! Rayon thread pool configuration for autoplay workloads.
//!
//! Use [WorkerPool::install] to run parallel autoplay with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// Configures how many worker threads are used for parallel batch execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a thread pool with this worker count. If [workers](WorkerPool::workers) is 0,
    /// uses the global Rayon pool. If a dedicated pool cannot be built, falls back to the global one.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(target: "parallel", workers = self.workers, error = %err, "thread pool build failed, using global pool");
                f()
            }
        }
    }
}
