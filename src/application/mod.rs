//! Application layer: per-test execution lifecycle and worker pool
//! orchestration (§4.4, §4.5).

pub mod test_executor;
pub mod worker_pool;

pub use test_executor::{ExecutorOptions, TestExecutor};
pub use worker_pool::WorkerPool;
