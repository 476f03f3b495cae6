//! Job queue port: the FIFO list the worker pool polls for test-DSL payloads.

use async_trait::async_trait;

use crate::domain::error::StoreError;

/// A FIFO list with a blocking pop and a non-blocking tail append.
///
/// Producers (the `enqueue` CLI, or any external system) append DSL lines;
/// worker slots pop them with blocking semantics. Requeue-on-shutdown
/// (§4.5) uses the same `push` operation used by producers.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Appends `payload` to the tail of the queue.
    async fn push(&self, payload: &str) -> Result<(), StoreError>;

    /// Blocks until a payload is available, then pops and returns it.
    ///
    /// Callers race this against the shutdown signal with `tokio::select!`;
    /// dropping the future on the losing branch is sufficient cancellation,
    /// so implementations do not need their own cancellation mechanism.
    async fn blocking_pop(&self) -> Result<String, StoreError>;

    /// Pings the store to verify reachability; used at worker startup.
    async fn ping(&self) -> Result<(), StoreError>;
}
