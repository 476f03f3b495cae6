//! Carbon/statsd-shaped metrics sink: fire-and-forget UDP plaintext lines.
//!
//! The teacher has no metrics-publication module of its own to ground this
//! on; the wire format (`metric.path value timestamp\n` over UDP) is the
//! shape used across the wider example pack for external metrics
//! collectors. Collector failures are logged at `warn` and never
//! propagated — publishing a metric must never affect the result pipeline.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::warn;

use crate::domain::ports::MetricsSink;

/// Sends `metric.path value timestamp\n` lines to a carbon-shaped UDP
/// collector. One socket is bound at construction and reused for every
/// send; the `connect`ed destination means `send` can be used instead of
/// `send_to` on the hot path.
pub struct CarbonMetricsSink {
    socket: UdpSocket,
}

impl CarbonMetricsSink {
    /// Binds an ephemeral local UDP socket and connects it to `collector`
    /// (e.g. `"127.0.0.1:2003"`).
    pub async fn connect(collector: &str) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(collector).await?;
        Ok(Self { socket })
    }

    async fn send_line(&self, path: &str, value: f64) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let line = format!("{path} {value} {timestamp}\n");
        if let Err(err) = self.socket.send(line.as_bytes()).await {
            warn!(%err, %path, "failed to publish metric");
        }
    }
}

#[async_trait]
impl MetricsSink for CarbonMetricsSink {
    async fn record_resolution(&self, test_type: &str, succeeded: bool) {
        let path = format!(
            "overseer.resolution.{test_type}.{}",
            if succeeded { "success" } else { "failure" }
        );
        self.send_line(&path, 1.0).await;
    }

    async fn record_invocation(&self, test_type: &str, succeeded: bool) {
        let path = format!(
            "overseer.invocation.{test_type}.{}",
            if succeeded { "success" } else { "failure" }
        );
        self.send_line(&path, 1.0).await;
    }

    async fn record_attempts(&self, test_type: &str, attempts: u32) {
        let path = format!("overseer.attempts.{test_type}");
        self.send_line(&path, f64::from(attempts)).await;
    }
}
