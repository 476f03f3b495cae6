//! In-process adapters satisfying `JobQueue`/`ResultStore` without a
//! network round trip. Used by the test suite and the CLI's dry-run mode,
//! mirroring the teacher's in-memory null-object adapters.

pub mod job_queue;
pub mod result_store;

pub use job_queue::MemoryJobQueue;
pub use result_store::MemoryResultStore;
