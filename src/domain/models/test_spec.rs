//! `TestSpec` domain model.
//!
//! A `TestSpec` is the parsed form of one test-DSL line. It is immutable
//! after parsing; the executor derives shallow copies (e.g. with `target`
//! overwritten by a concrete probed IP, or `dedup_duration` defaulted in).

use std::collections::BTreeMap;
use std::time::Duration;

/// One parsed test-DSL line.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSpec {
    /// Original DSL text, unredacted. Redaction happens on demand via
    /// [`TestSpec::sanitize`], never by mutating this field.
    pub input: String,
    /// Protocol name, e.g. `"http"`. Looked up in the protocol registry.
    pub test_type: String,
    /// Hostname, URL, or IP literal as written in the DSL line.
    pub target: String,
    /// Handler-specific arguments, already validated against the handler's
    /// `arguments()` schema by the parser.
    pub arguments: BTreeMap<String, String>,
    /// Per-test override of the worker's default handler timeout.
    pub timeout: Option<Duration>,
    /// Per-test override of the worker's default retry count.
    pub max_retries: Option<u32>,
    /// Per-test dedup window. `None` means "use the worker default" unless
    /// this is a period-test, in which case no default ever applies.
    pub dedup_duration: Option<Duration>,
    /// Caps the number of resolved addresses probed, 0 meaning unlimited.
    pub max_targets_count: usize,
    /// Presence of this field marks the spec as a period-test.
    pub period_duration: Option<Duration>,
    /// Sleep between period-test iterations.
    pub period_sleep: Option<Duration>,
    /// Failure-rate threshold (0.0..=1.0) above which a period-test fails.
    pub period_threshold: Option<f64>,
}

/// Argument names whose values are always masked by [`TestSpec::sanitize`].
///
/// This is the minimum set required by the spec; a future parser extension
/// point can grow it without touching the executor, which only ever calls
/// `sanitize()` as an opaque callback.
pub const SENSITIVE_ARGUMENTS: &[&str] = &["password"];

impl TestSpec {
    /// True if this spec is a period-test (its single logical outcome is an
    /// aggregate over many sub-invocations rather than one attempt).
    pub fn is_period_test(&self) -> bool {
        self.period_duration.is_some()
    }

    /// Returns a clone with `target` replaced by the concrete probed address.
    pub fn with_probed_target(&self, probed_target: impl Into<String>) -> Self {
        Self {
            target: probed_target.into(),
            ..self.clone()
        }
    }

    /// Returns a clone with `dedup_duration` set, used for worker-level
    /// default injection (never applied to period-tests).
    pub fn with_dedup_duration(&self, dedup_duration: Duration) -> Self {
        Self {
            dedup_duration: Some(dedup_duration),
            ..self.clone()
        }
    }

    /// Rewrites `input`, masking the value of every sensitive argument while
    /// preserving the original token order and every other token verbatim.
    ///
    /// Idempotent: sanitizing an already-sanitized string is a no-op, since
    /// the masked value `***` itself never matches a sensitive-argument
    /// pattern that would need further masking.
    pub fn sanitize(&self) -> String {
        let mut out = String::with_capacity(self.input.len());
        let mut tokens = self.input.split(' ').peekable();

        while let Some(token) = tokens.next() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);

            if token == "with" {
                if let Some(&key) = tokens.peek() {
                    if SENSITIVE_ARGUMENTS.contains(&key) {
                        out.push(' ');
                        out.push_str(key);
                        tokens.next();
                        if tokens.peek().is_some() {
                            out.push_str(" ***");
                            tokens.next();
                        }
                    }
                }
            }
        }

        out
    }
}
