//! Test executor: the per-test lifecycle (§4.4).
//!
//! Carries one `TestSpec` from handler lookup through target resolution,
//! per-target fan-out, retry/period execution, and result emission. The
//! only component that calls protocol handlers and the result store.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use tracing::{instrument, warn};

use crate::domain::error::{HandlerError, ResolutionError};
use crate::domain::models::{DedupDecision, Fingerprint, TestResult, TestSpec};
use crate::domain::ports::{HandlerOptions, MetricsSink, ProtocolHandler, ResultStore};
use crate::services::protocol_registry::ProtocolRegistry;
use crate::services::{decide, DedupEffect};

/// Worker-level defaults the executor falls back to when a `TestSpec`
/// carries no per-test override.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub ipv4: bool,
    pub ipv6: bool,
    pub retry_enabled: bool,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub default_timeout: Duration,
    pub default_dedup: Option<Duration>,
    pub tag: String,
    pub period_sleep_default: Duration,
    pub period_threshold_default: f64,
}

/// Runs one `TestSpec` through resolution, fan-out, retry/period execution,
/// deduplication, and publication.
pub struct TestExecutor {
    registry: Arc<ProtocolRegistry>,
    result_store: Arc<dyn ResultStore>,
    metrics: Arc<dyn MetricsSink>,
    options: ExecutorOptions,
}

impl TestExecutor {
    /// Builds an executor over the given registry, store, metrics sink, and
    /// worker-level defaults.
    pub fn new(
        registry: Arc<ProtocolRegistry>,
        result_store: Arc<dyn ResultStore>,
        metrics: Arc<dyn MetricsSink>,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            registry,
            result_store,
            metrics,
            options,
        }
    }

    /// Carries `spec` through its full lifecycle, publishing one `Result`
    /// per probed target. Never returns an error: every failure mode is
    /// either folded into a published `Result` or logged and swallowed.
    #[instrument(skip(self, spec), fields(worker_id = %worker_id, test_type = %spec.test_type, target = %spec.target))]
    pub async fn execute(&self, worker_id: &str, spec: &TestSpec) {
        let spec = self.inject_default_dedup(spec);

        let Some(handler) = self.registry.build(&spec.test_type) else {
            self.finalize_and_publish(
                &spec,
                &spec.target,
                Some(format!("unknown protocol: {}", spec.test_type)),
                None,
            )
            .await;
            return;
        };
        let handler: Arc<dyn ProtocolHandler> = Arc::from(handler);

        let targets = match self.derive_targets(&spec, handler.as_ref()).await {
            Ok(targets) => targets,
            Err(err) => {
                self.finalize_and_publish(&spec, &spec.target, Some(err.to_string()), None)
                    .await;
                return;
            }
        };

        let options = HandlerOptions {
            timeout: spec.timeout.unwrap_or(self.options.default_timeout),
        };

        let runs = targets.into_iter().map(|target| {
            let handler = Arc::clone(&handler);
            let spec = spec.clone();
            async move {
                if spec.is_period_test() {
                    self.run_period(&spec, handler, &target, options).await;
                } else {
                    self.run_single(&spec, handler, &target, options).await;
                }
            }
        });
        join_all(runs).await;
    }

    /// (a) Default dedup injection. Period-tests never receive an implicit
    /// dedup window.
    fn inject_default_dedup(&self, spec: &TestSpec) -> TestSpec {
        if spec.dedup_duration.is_none() && !spec.is_period_test() {
            if let Some(default_dedup) = self.options.default_dedup {
                return spec.with_dedup_duration(default_dedup);
            }
        }
        spec.clone()
    }

    /// (c) Target derivation: resolves and filters by address family, or
    /// passes the raw target through for handlers that resolve themselves.
    async fn derive_targets(
        &self,
        spec: &TestSpec,
        handler: &dyn ProtocolHandler,
    ) -> Result<Vec<String>, ResolutionError> {
        if !handler.should_resolve_hostname() {
            return Ok(vec![spec.target.clone()]);
        }

        let host = extract_host(&spec.target);
        let lookup = format!("{host}:0");
        let resolved = tokio::net::lookup_host(lookup).await;
        self.metrics
            .record_resolution(&spec.test_type, resolved.is_ok())
            .await;

        let addrs: Vec<IpAddr> = resolved
            .map_err(|_| ResolutionError::LookupFailed(host.to_string()))?
            .map(|addr: SocketAddr| addr.ip())
            .collect();

        let mut filtered: Vec<String> = addrs
            .into_iter()
            .filter(|ip| self.family_enabled(*ip))
            .map(|ip| ip.to_string())
            .collect();

        if filtered.is_empty() {
            let family = match (self.options.ipv4, self.options.ipv6) {
                (true, false) => "ipv4",
                (false, true) => "ipv6",
                _ => "ipv4/ipv6",
            };
            return Err(ResolutionError::NoAddressesForFamily(family, host.to_string()));
        }

        if spec.max_targets_count > 0 && filtered.len() > spec.max_targets_count {
            filtered.truncate(spec.max_targets_count);
        }

        Ok(filtered)
    }

    /// IPv4-mapped IPv6 addresses count as IPv4; everything else counts as
    /// its native family.
    fn family_enabled(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.options.ipv4,
            IpAddr::V6(v6) => {
                if v6.to_ipv4_mapped().is_some() {
                    self.options.ipv4
                } else {
                    self.options.ipv6
                }
            }
        }
    }

    /// (e) Non-period path: bounded retry, stopping at the first success.
    async fn run_single(
        &self,
        spec: &TestSpec,
        handler: Arc<dyn ProtocolHandler>,
        target: &str,
        options: HandlerOptions,
    ) {
        let max_attempts = if !self.options.retry_enabled {
            1
        } else {
            1 + spec.max_retries.unwrap_or(self.options.retry_count)
        };

        let mut attempts = 0u32;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;
            match invoke_handler(Arc::clone(&handler), spec.clone(), target.to_string(), options).await {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(err) => {
                    last_error = Some(err.to_string());
                    if attempts >= max_attempts {
                        break;
                    }
                    tokio::time::sleep(self.options.retry_delay).await;
                }
            }
        }

        self.metrics
            .record_invocation(&spec.test_type, last_error.is_none())
            .await;
        self.metrics.record_attempts(&spec.test_type, attempts).await;

        self.finalize_and_publish(spec, target, last_error, None).await;
    }

    /// (f) Period path: retries are disabled; each invocation is a single
    /// shot and the aggregated error rate decides pass/fail.
    async fn run_period(
        &self,
        spec: &TestSpec,
        handler: Arc<dyn ProtocolHandler>,
        target: &str,
        options: HandlerOptions,
    ) {
        let sleep = spec.period_sleep.unwrap_or(self.options.period_sleep_default);
        let threshold = spec
            .period_threshold
            .unwrap_or(self.options.period_threshold_default);
        let period_duration = spec
            .period_duration
            .expect("run_period only called for period-tests");
        let deadline = Instant::now() + period_duration;

        let mut iterations = 0u32;
        let mut success = 0u32;
        let mut fail = 0u32;
        let mut failure_log = Vec::new();

        loop {
            if Instant::now() >= deadline {
                break;
            }
            iterations += 1;
            let start = Instant::now();
            let outcome =
                invoke_handler(Arc::clone(&handler), spec.clone(), target.to_string(), options).await;
            let elapsed = start.elapsed();

            match outcome {
                Ok(()) => success += 1,
                Err(err) => {
                    fail += 1;
                    failure_log.push(format!(
                        "test {iterations} failed, took {}ms: {err}",
                        elapsed.as_millis()
                    ));
                }
            }

            tokio::time::sleep(sleep).await;
        }

        let total = success + fail;
        let err_rate = if total == 0 {
            0.0
        } else {
            f64::from(fail) / f64::from(total)
        };

        let error = if err_rate > threshold {
            Some(format!(
                "{fail} tests failed out of {total} ({:.2}%)",
                err_rate * 100.0
            ))
        } else {
            None
        };
        let details = if failure_log.is_empty() {
            None
        } else {
            Some(failure_log.join("\n"))
        };

        self.metrics
            .record_invocation(&spec.test_type, error.is_none())
            .await;
        self.metrics.record_attempts(&spec.test_type, iterations).await;

        self.finalize_and_publish(spec, target, error, details).await;
    }

    /// (g) Finalization: builds the `Result`, runs it through the
    /// deduplication controller, applies store side effects, and publishes
    /// any surviving record.
    async fn finalize_and_publish(
        &self,
        spec: &TestSpec,
        target: &str,
        error: Option<String>,
        details: Option<String>,
    ) {
        let sanitized_input = spec.sanitize();
        let now = now_unix();
        let test_failed = error.is_some();

        let mut result = TestResult::new(
            sanitized_input.clone(),
            target,
            spec.test_type.clone(),
            now,
            self.options.tag.clone(),
            error,
        );
        result.details = details;

        let fp = Fingerprint::of(&sanitized_input);
        let dedup_window = spec.dedup_duration;

        let (cache_time, last_alert_time) = if dedup_window.is_some() {
            let cache = self
                .result_store
                .get_dedup_cache_time(fp)
                .await
                .unwrap_or_else(|err| {
                    warn!(%err, "failed to read dedup cache-time");
                    None
                });
            let last = self
                .result_store
                .get_last_alert_time(fp)
                .await
                .unwrap_or_else(|err| {
                    warn!(%err, "failed to read dedup last-alert-time");
                    None
                });
            (cache, last)
        } else {
            (None, None)
        };

        let outcome = decide(test_failed, dedup_window, now, cache_time, last_alert_time);

        match outcome.decision {
            DedupDecision::EmitDedupedAlert => result.is_dedup = true,
            DedupDecision::EmitRecovery => result.recovered = true,
            DedupDecision::EmitAlert | DedupDecision::Suppress | DedupDecision::EmitNothing => {}
        }

        if let Some(window) = dedup_window {
            let ttl = crate::dedup_key_ttl(window);
            match outcome.effect {
                DedupEffect::None => {}
                DedupEffect::SetBoth => {
                    if let Err(err) = self.result_store.set_dedup_cache_time(fp, now, ttl).await {
                        warn!(%err, "failed to set dedup cache-time");
                    }
                    if let Err(err) = self.result_store.set_last_alert_time(fp, now, ttl).await {
                        warn!(%err, "failed to set dedup last-alert-time");
                    }
                }
                DedupEffect::RefreshCacheOnly => {
                    if let Err(err) = self.result_store.set_dedup_cache_time(fp, now, ttl).await {
                        warn!(%err, "failed to refresh dedup cache-time");
                    }
                }
                DedupEffect::ClearBoth => {
                    if let Err(err) = self.result_store.clear_dedup_cache_time(fp).await {
                        warn!(%err, "failed to clear dedup cache-time");
                    }
                    if let Err(err) = self.result_store.clear_last_alert_time(fp).await {
                        warn!(%err, "failed to clear dedup last-alert-time");
                    }
                }
            }
        }

        if outcome.decision.emits() {
            if let Err(err) = self.result_store.publish(&result).await {
                warn!(%err, "failed to publish result");
            }
        }
    }
}

/// Invokes `handler` inside a spawned task so a handler panic surfaces as a
/// `JoinError` rather than unwinding the worker (§7).
async fn invoke_handler(
    handler: Arc<dyn ProtocolHandler>,
    spec: TestSpec,
    target: String,
    options: HandlerOptions,
) -> Result<(), HandlerError> {
    let join = tokio::spawn(async move { handler.run_test(&spec, &target, options).await });
    match join.await {
        Ok(result) => result,
        Err(join_err) => Err(HandlerError::Panicked(join_err.to_string())),
    }
}

/// Extracts the host portion of a target that may be a bare hostname, an
/// IP literal, or a URL. `https://example.com:8443/path` → `example.com`.
fn extract_host(target: &str) -> &str {
    let after_scheme = target.split("://").nth(1).unwrap_or(target);
    let authority = after_scheme.split('/').next().unwrap_or(after_scheme);
    if let Some(bracket_end) = authority.strip_prefix('[') {
        return bracket_end.split(']').next().unwrap_or(authority);
    }
    authority.rsplit_once(':').map_or(authority, |(host, _)| host)
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_host_strips_scheme_path_and_port() {
        assert_eq!(extract_host("example.com"), "example.com");
        assert_eq!(extract_host("https://example.com"), "example.com");
        assert_eq!(extract_host("https://example.com:8443/path"), "example.com");
        assert_eq!(extract_host("http://example.com/a/b"), "example.com");
    }

    #[test]
    fn extract_host_handles_bracketed_ipv6_literals() {
        assert_eq!(extract_host("https://[::1]:8443/"), "::1");
    }
}
