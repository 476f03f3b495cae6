//! Overseer: a distributed remote-protocol prober.
//!
//! A fleet of stateless workers pull test specifications from a shared
//! queue, probe each resolved target, and publish structured results,
//! deduplicating repeat failures and detecting recovery. See `SPEC_FULL.md`
//! for the full design; this crate is organized in hexagonal layers:
//! `domain` (models, errors, ports), `services` (pure decision logic),
//! `application` (the test executor and worker pool), `adapters`
//! (Redis/in-memory stores, built-in protocol handlers, the DSL parser),
//! `infrastructure` (config, logging, metrics), and `cli`.

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::adapters::redis::{self, RedisJobQueue, RedisResultStore};
use crate::application::ExecutorOptions;
use crate::domain::models::Config;
use crate::domain::ports::{JobQueue, MetricsSink, NullMetricsSink, ResultStore};
use crate::infrastructure::metrics::carbon::CarbonMetricsSink;
use crate::services::ProtocolRegistry;

/// Wiring shared by every entry point: the populated protocol registry and
/// the store/metrics handles, all behind their port traits.
pub struct Context {
    pub registry: Arc<ProtocolRegistry>,
    pub job_queue: Arc<dyn JobQueue>,
    pub result_store: Arc<dyn ResultStore>,
    pub metrics: Arc<dyn MetricsSink>,
}

/// Builds the full runtime context from a loaded `Config`: connects to
/// Redis, registers the built-in protocol handlers, and wires a metrics
/// sink (Carbon-backed when enabled, a no-op otherwise).
pub async fn build_context(config: &Config) -> Result<Context> {
    let mut registry = ProtocolRegistry::default();
    adapters::protocols::register_builtin_handlers(&mut registry);

    let conn = redis::connect(&config.store)
        .await
        .context("failed to connect to the backing store")?;
    let job_queue: Arc<dyn JobQueue> = Arc::new(RedisJobQueue::new(conn.clone()));
    let result_store: Arc<dyn ResultStore> = Arc::new(RedisResultStore::new(conn));

    let metrics: Arc<dyn MetricsSink> = match (&config.metrics.enabled, &config.metrics.host) {
        (true, Some(host)) => Arc::new(
            CarbonMetricsSink::connect(host)
                .context("failed to bind metrics collector socket")?,
        ),
        _ => Arc::new(NullMetricsSink),
    };

    Ok(Context {
        registry: Arc::new(registry),
        job_queue,
        result_store,
        metrics,
    })
}

/// Derives `ExecutorOptions` from the worker-level configuration.
pub fn executor_options(config: &Config) -> ExecutorOptions {
    ExecutorOptions {
        ipv4: config.ipv4,
        ipv6: config.ipv6,
        retry_enabled: config.retry.enabled,
        retry_count: config.retry.count,
        retry_delay: config.retry.delay.as_duration(),
        default_timeout: config.timeout.as_duration(),
        default_dedup: config.dedup.map(crate::domain::models::config::DurationSeconds::as_duration),
        tag: config.tag.clone(),
        period_sleep_default: config.period_test.sleep.as_duration(),
        period_threshold_default: config.period_test.threshold,
    }
}

/// Ten times the dedup window, the TTL applied to both dedup keys (§3).
pub fn dedup_key_ttl(dedup_duration: Duration) -> Duration {
    dedup_duration.saturating_mul(10)
}
