//! Redis-backed adapters: job queue, result/dedup store, and the shared
//! connection they ride on.

pub mod connection;
pub mod job_queue;
pub mod result_store;

pub use connection::connect;
pub use job_queue::RedisJobQueue;
pub use result_store::RedisResultStore;
