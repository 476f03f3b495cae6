//! Metrics sink port: counters the executor emits on the hot path.
//!
//! Carried on the executor as an injected dependency so metrics routing
//! stays out of the domain; a `NullMetricsSink` satisfies this contract
//! when metrics are disabled.

use async_trait::async_trait;

/// Sink for the three counters the executor emits per test run.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Records the outcome of resolving `spec.target` to addresses.
    async fn record_resolution(&self, test_type: &str, succeeded: bool);

    /// Records one handler invocation and whether it succeeded.
    async fn record_invocation(&self, test_type: &str, succeeded: bool);

    /// Records the number of attempts a non-period test took to finish,
    /// or the number of iterations a period test ran.
    async fn record_attempts(&self, test_type: &str, attempts: u32);
}

/// A sink that discards every measurement; the default when metrics are
/// not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetricsSink;

#[async_trait]
impl MetricsSink for NullMetricsSink {
    async fn record_resolution(&self, _test_type: &str, _succeeded: bool) {}
    async fn record_invocation(&self, _test_type: &str, _succeeded: bool) {}
    async fn record_attempts(&self, _test_type: &str, _attempts: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sink_accepts_all_calls() {
        let sink = NullMetricsSink;
        sink.record_resolution("tcp", true).await;
        sink.record_invocation("tcp", false).await;
        sink.record_attempts("tcp", 3).await;
    }
}
