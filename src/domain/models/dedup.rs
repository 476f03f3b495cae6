//! Deduplication data types: stable fingerprints and controller decisions.

use std::fmt;

/// A stable hash over a result's sanitized input string. Equivalent inputs
/// produce equal fingerprints; differing argument values never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Computes the fingerprint of a sanitized input string.
    ///
    /// Uses `DefaultHasher` (SipHash-1-3) seeded identically across calls —
    /// acceptable here because fingerprints only need to be stable within a
    /// single running process family sharing the same store, not portable
    /// across Rust versions.
    pub fn of(sanitized_input: &str) -> Self {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        sanitized_input.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Renders the fingerprint as a lowercase hex string, the form used in
    /// the dedup store's key names (`overseer.dedup-cache.<hex>`).
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

/// The deduplication controller's decision for one test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupDecision {
    /// First failure for this fingerprint: emit, with `is_dedup=false`.
    EmitAlert,
    /// Repeat failure outside the dedup window: emit, with `is_dedup=true`.
    EmitDedupedAlert,
    /// Repeat failure inside the dedup window: do not emit.
    Suppress,
    /// First success after a tracked failure: emit, with `recovered=true`.
    EmitRecovery,
    /// Success with no prior tracked failure and dedup enabled: do not emit.
    EmitNothing,
}

impl DedupDecision {
    /// Whether this decision results in a published `TestResult`.
    pub const fn emits(&self) -> bool {
        !matches!(self, Self::Suppress | Self::EmitNothing)
    }
}
