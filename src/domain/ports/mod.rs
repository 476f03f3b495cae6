//! Ports: trait boundaries the domain depends on and adapters implement.

pub mod job_queue;
pub mod metrics;
pub mod protocol_handler;
pub mod result_store;

pub use job_queue::JobQueue;
pub use metrics::{MetricsSink, NullMetricsSink};
pub use protocol_handler::{ArgumentPattern, HandlerFactory, HandlerOptions, ProtocolHandler};
pub use result_store::ResultStore;
