pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, run_autoplay_batches};
pub use pool::WorkerPool;
