//! Protocol handler port.
//!
//! Defines the contract every protocol implementation (HTTP, DNS, SSH, ...)
//! must satisfy. The executor is the only caller; handlers are looked up
//! through the protocol registry (`services::protocol_registry`) and are
//! otherwise opaque to the rest of the system, matching the teacher's
//! ingestion/egress adapter port-trait shape.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::HandlerError;
use crate::domain::models::TestSpec;

/// Per-invocation options passed to a handler, derived from worker/spec
/// configuration. Handlers must honor `timeout` as an upper bound on their
/// own wall-clock execution.
#[derive(Debug, Clone, Copy)]
pub struct HandlerOptions {
    /// Upper bound on handler execution time.
    pub timeout: Duration,
}

/// A validation pattern for one handler argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentPattern {
    /// Any non-empty string is accepted.
    AnyString,
    /// The value must parse as an unsigned integer.
    UnsignedInt,
    /// The value must be one of the given literal strings.
    OneOf(&'static [&'static str]),
}

impl ArgumentPattern {
    /// Returns true if `value` satisfies this pattern.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::AnyString => !value.is_empty(),
            Self::UnsignedInt => value.parse::<u64>().is_ok(),
            Self::OneOf(choices) => choices.contains(&value),
        }
    }
}

/// Protocol handler contract.
///
/// Handlers must be reentrant: safe for concurrent use across tasks
/// executing distinct tests, with per-invocation state living on the stack.
/// A handler must never mutate the `TestSpec` it is given.
#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    /// The protocol name this handler registers under (e.g. `"http"`).
    fn name(&self) -> &'static str;

    /// Mapping from argument name to its validation pattern. The parser
    /// uses this to accept or reject DSL lines before they ever reach the
    /// executor.
    fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern>;

    /// Whether the executor should resolve `spec.target` to IP addresses
    /// before invoking this handler. When false, the raw target string is
    /// passed through unchanged.
    fn should_resolve_hostname(&self) -> bool;

    /// A self-documenting usage string for the `examples` CLI surface.
    fn example(&self) -> &'static str;

    /// Runs one probe attempt against `probed_target`.
    ///
    /// `spec` must not be mutated. Implementations should respect
    /// `options.timeout` using `tokio::time::timeout` or equivalent.
    async fn run_test(
        &self,
        spec: &TestSpec,
        probed_target: &str,
        options: HandlerOptions,
    ) -> Result<(), HandlerError>;
}

/// A zero-argument factory producing a fresh handler instance, registered
/// under a protocol name in the registry.
pub type HandlerFactory = Box<dyn Fn() -> Box<dyn ProtocolHandler> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_int_pattern_rejects_non_numeric() {
        assert!(ArgumentPattern::UnsignedInt.matches("443"));
        assert!(!ArgumentPattern::UnsignedInt.matches("abc"));
        assert!(!ArgumentPattern::UnsignedInt.matches("-1"));
    }

    #[test]
    fn one_of_pattern_restricts_choices() {
        let pat = ArgumentPattern::OneOf(&["a", "aaaa"]);
        assert!(pat.matches("a"));
        assert!(!pat.matches("mx"));
    }

    #[test]
    fn any_string_rejects_empty() {
        assert!(!ArgumentPattern::AnyString.matches(""));
        assert!(ArgumentPattern::AnyString.matches("x"));
    }
}
