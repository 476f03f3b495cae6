//! `Result` domain model — one emitted record per (test, probed target).

use serde::{Deserialize, Serialize};

/// One result record, serialized as a single-line JSON object onto the
/// result queue (§6 of the design: stable field names, snake_case on the
/// wire is *not* used — the queue's consumers expect these exact names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Sanitized original DSL text.
    pub input: String,
    /// The address actually probed, or the pass-through target.
    pub target: String,
    /// Protocol name.
    #[serde(rename = "type")]
    pub test_type: String,
    /// Wall-clock seconds since epoch at emission.
    pub time: i64,
    /// Worker-global label.
    pub tag: String,
    /// Absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Multi-line diagnostic payload, used by period-tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// True when this alert fires after a prior alert for the same
    /// fingerprint, still within the dedup window's outer horizon.
    #[serde(rename = "isDedup")]
    pub is_dedup: bool,
    /// True when this is the first success after a tracked failure.
    pub recovered: bool,
}

impl TestResult {
    /// Builds a bare success/failure result; `is_dedup`/`recovered` default
    /// to `false` and are set by the deduplication controller.
    pub fn new(
        input: impl Into<String>,
        target: impl Into<String>,
        test_type: impl Into<String>,
        time: i64,
        tag: impl Into<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            input: input.into(),
            target: target.into(),
            test_type: test_type.into(),
            time,
            tag: tag.into(),
            error,
            details: None,
            is_dedup: false,
            recovered: false,
        }
    }

    /// True if this record represents a successful probe.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
