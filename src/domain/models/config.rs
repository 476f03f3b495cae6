//! Worker configuration model, loaded by `infrastructure::config::ConfigLoader`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level worker configuration: CLI flags, config file, and env vars all
/// populate this one structure before the worker pool starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Number of concurrent worker slots.
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// Whether IPv4 addresses are probed.
    #[serde(default = "default_true")]
    pub ipv4: bool,

    /// Whether IPv6 addresses are probed.
    #[serde(default)]
    pub ipv6: bool,

    /// Retry policy applied to non-period tests with no per-test override.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Worker-level default dedup window; `None` disables dedup by default.
    #[serde(default)]
    pub dedup: Option<DurationSeconds>,

    /// Per-handler invocation timeout applied when a test has no override.
    #[serde(default = "default_timeout")]
    pub timeout: DurationSeconds,

    /// Worker-global label attached to every published Result.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Worker-level period-test defaults.
    #[serde(default)]
    pub period_test: PeriodTestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics collector configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            ipv4: true,
            ipv6: false,
            retry: RetryConfig::default(),
            dedup: None,
            timeout: default_timeout(),
            tag: default_tag(),
            store: StoreConfig::default(),
            period_test: PeriodTestConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

const fn default_parallel() -> usize {
    10
}

const fn default_true() -> bool {
    true
}

const fn default_timeout() -> DurationSeconds {
    DurationSeconds(5)
}

fn default_tag() -> String {
    "overseer".to_string()
}

/// A duration stored and (de)serialized as whole seconds, matching the
/// CLI's `--timeout`/`--dedup` flags (parsed through `humantime`-like text
/// by the DSL layer, but stored here as a plain integer for config files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationSeconds(pub u64);

impl DurationSeconds {
    /// Converts to a `std::time::Duration`.
    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl From<DurationSeconds> for Duration {
    fn from(value: DurationSeconds) -> Self {
        value.as_duration()
    }
}

/// Retry policy for the non-period execution path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Whether retries are enabled at all. When false, `maxAttempts := 1`
    /// regardless of `count`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of retries after the first attempt.
    #[serde(default = "default_retry_count")]
    pub count: u32,

    /// Fixed delay between attempts. Deliberately flat, not exponential:
    /// period-test aggregation already smooths noisy failures, so
    /// executor-level backoff would double-count that smoothing.
    #[serde(default = "default_retry_delay")]
    pub delay: DurationSeconds,
}

const fn default_retry_count() -> u32 {
    2
}

const fn default_retry_delay() -> DurationSeconds {
    DurationSeconds(1)
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: default_retry_count(),
            delay: default_retry_delay(),
        }
    }
}

/// Backing store connection settings (Redis-shaped job/result/dedup store).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Redis host (`host:port`), or a unix socket path when `socket` is set.
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Optional authentication password.
    #[serde(default)]
    pub pass: Option<String>,

    /// Logical database index.
    #[serde(default)]
    pub db: i64,

    /// Unix socket path, overriding `host` when present.
    #[serde(default)]
    pub socket: Option<String>,

    /// Connection/operation timeout.
    #[serde(default = "default_store_timeout")]
    pub timeout: DurationSeconds,
}

fn default_redis_host() -> String {
    "127.0.0.1:6379".to_string()
}

const fn default_store_timeout() -> DurationSeconds {
    DurationSeconds(5)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            pass: None,
            db: 0,
            socket: None,
            timeout: default_store_timeout(),
        }
    }
}

/// Worker-level period-test defaults, used when a spec omits its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeriodTestConfig {
    /// Sleep between iterations.
    #[serde(default = "default_period_sleep")]
    pub sleep: DurationSeconds,

    /// Failure-rate threshold, 0.0..=1.0.
    #[serde(default)]
    pub threshold: f64,
}

const fn default_period_sleep() -> DurationSeconds {
    DurationSeconds(5)
}

impl Default for PeriodTestConfig {
    fn default() -> Self {
        Self {
            sleep: default_period_sleep(),
            threshold: 0.0,
        }
    }
}

/// Logging configuration, mirrored after the teacher's `LogConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout-only when absent.
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Metrics collector configuration, read from `METRICS`/`METRICS_HOST`/
/// `METRICS_PROTOCOL` environment variables (§10.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MetricsConfig {
    /// Whether metrics publication is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// `host:port` of the carbon-shaped UDP collector.
    #[serde(default)]
    pub host: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_ipv4_only() {
        let config = Config::default();
        assert!(config.ipv4);
        assert!(!config.ipv6);
        assert_eq!(config.parallel, 10);
        assert!(config.dedup.is_none());
    }

    #[test]
    fn retry_default_is_enabled_with_flat_delay() {
        let retry = RetryConfig::default();
        assert!(retry.enabled);
        assert_eq!(retry.count, 2);
        assert_eq!(retry.delay.as_duration(), Duration::from_secs(1));
    }

    #[test]
    fn yaml_round_trip_preserves_overrides() {
        let yaml = "parallel: 20\nipv6: true\ntag: prod\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.parallel, 20);
        assert!(config.ipv6);
        assert!(config.ipv4, "unspecified fields keep their default");
        assert_eq!(config.tag, "prod");
    }
}
