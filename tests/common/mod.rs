//! Shared fixtures for integration tests: a scriptable protocol handler and
//! small builders over the in-memory adapters, mirroring the teacher's
//! `tests/common/mod.rs` mock-and-helper style.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use overseer::application::ExecutorOptions;
use overseer::domain::error::HandlerError;
use overseer::domain::models::TestSpec;
use overseer::domain::ports::{ArgumentPattern, HandlerOptions, ProtocolHandler};
use overseer::services::ProtocolRegistry;

/// A handler whose outcome for each successive call is taken from a fixed
/// script, cycling back to the start once exhausted.
struct ScriptedHandler {
    name: &'static str,
    script: Arc<Vec<Result<(), HandlerError>>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ProtocolHandler for ScriptedHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern> {
        BTreeMap::new()
    }

    fn should_resolve_hostname(&self) -> bool {
        false
    }

    fn example(&self) -> &'static str {
        "x must run scripted"
    }

    async fn run_test(
        &self,
        _spec: &TestSpec,
        _probed_target: &str,
        _options: HandlerOptions,
    ) -> Result<(), HandlerError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script[index % self.script.len()].clone()
    }
}

/// Registers a scripted handler under `name` and returns a shared counter
/// of how many times it has been invoked, across every instance the
/// registry has built (every `execute()` call builds a fresh handler, but
/// all of them share this one counter).
pub fn register_scripted(
    registry: &mut ProtocolRegistry,
    name: &'static str,
    script: Vec<Result<(), HandlerError>>,
) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let script = Arc::new(script);
    let calls_for_factory = Arc::clone(&calls);
    registry.register(
        name,
        Box::new(move || {
            Box::new(ScriptedHandler {
                name,
                script: Arc::clone(&script),
                calls: Arc::clone(&calls_for_factory),
            })
        }),
    );
    calls
}

/// Shorthand for a handler that always succeeds.
pub fn register_always_ok(registry: &mut ProtocolRegistry, name: &'static str) -> Arc<AtomicUsize> {
    register_scripted(registry, name, vec![Ok(())])
}

/// Shorthand for a handler that always fails with `message`.
pub fn register_always_fails(
    registry: &mut ProtocolRegistry,
    name: &'static str,
    message: &str,
) -> Arc<AtomicUsize> {
    register_scripted(
        registry,
        name,
        vec![Err(HandlerError::Failed(message.to_string()))],
    )
}

/// `ExecutorOptions` with retries enabled and short delays, suited to fast
/// tests.
pub fn fast_options() -> ExecutorOptions {
    ExecutorOptions {
        ipv4: true,
        ipv6: false,
        retry_enabled: true,
        retry_count: 2,
        retry_delay: std::time::Duration::from_millis(1),
        default_timeout: std::time::Duration::from_secs(1),
        default_dedup: None,
        tag: "test".to_string(),
        period_sleep_default: std::time::Duration::from_millis(10),
        period_threshold_default: 0.5,
    }
}

/// Builds a bare `TestSpec` for `test_type`/`target` with every optional
/// field at its default ("bare DSL line") value.
pub fn bare_spec(test_type: &str, target: &str) -> TestSpec {
    TestSpec {
        input: format!("{target} must run {test_type}"),
        test_type: test_type.to_string(),
        target: target.to_string(),
        arguments: BTreeMap::new(),
        timeout: None,
        max_retries: None,
        dedup_duration: None,
        max_targets_count: 0,
        period_duration: None,
        period_sleep: None,
        period_threshold: None,
    }
}
