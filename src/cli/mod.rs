//! CLI interface module.
//!
//! Mirrors the teacher's layout: a top-level `clap`-derived `Cli`/`Commands`
//! pair in this module, command handlers under `commands`.

pub mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::domain::models::config::DurationSeconds;
use crate::domain::models::Config;

/// Worker CLI: the flags here override `Config` fields loaded from the
/// environment and config file (§10.3 — "CLI overrides file"). With no
/// subcommand the worker pool runs to completion; the two subcommands are
/// one-shot operations that exit immediately after.
#[derive(Parser)]
#[command(name = "overseer")]
#[command(about = "Distributed remote-protocol prober", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Number of concurrent worker slots.
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Probe IPv4 addresses.
    #[arg(short = '4', long)]
    pub ipv4: bool,

    /// Probe IPv6 addresses.
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Enable or disable the bounded-retry policy.
    #[arg(long)]
    pub retry: Option<bool>,

    /// Number of retries after the first attempt.
    #[arg(long = "retry-count")]
    pub retry_count: Option<u32>,

    /// Fixed delay between retry attempts (`5s`, `1m`, ...).
    #[arg(long = "retry-delay")]
    pub retry_delay: Option<String>,

    /// Worker-level default dedup window (`5m`, `1h`, ...).
    #[arg(long)]
    pub dedup: Option<String>,

    /// Per-handler invocation timeout.
    #[arg(long)]
    pub timeout: Option<String>,

    /// Worker-global label attached to every published result.
    #[arg(long)]
    pub tag: Option<String>,

    /// Increase log verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Redis host (`host:port`).
    #[arg(long = "redis-host")]
    pub redis_host: Option<String>,

    /// Redis auth password.
    #[arg(long = "redis-pass")]
    pub redis_pass: Option<String>,

    /// Redis logical database index.
    #[arg(long = "redis-db")]
    pub redis_db: Option<i64>,

    /// Redis unix socket path, overriding `redis-host` when set.
    #[arg(long = "redis-socket")]
    pub redis_socket: Option<String>,

    /// Redis connection/operation timeout.
    #[arg(long = "redis-timeout")]
    pub redis_timeout: Option<String>,

    /// Worker-level default sleep between period-test iterations.
    #[arg(long = "period-test-sleep")]
    pub period_test_sleep: Option<String>,

    /// Worker-level default period-test failure-rate threshold (e.g. `40%`).
    #[arg(long = "period-test-threshold")]
    pub period_test_threshold: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push one test-DSL line onto the job queue and exit.
    Enqueue {
        /// A line in the `<target> must run <type> [with <key> <value>]*` grammar.
        line: String,
    },

    /// Print each registered protocol handler's example usage.
    Examples,
}

impl Cli {
    /// Applies the flags present on the command line onto a loaded `Config`,
    /// the highest-precedence layer after defaults/file/env (§10.3).
    pub fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigOverrideError> {
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }
        if self.ipv4 {
            config.ipv4 = true;
        }
        if self.ipv6 {
            config.ipv6 = true;
        }
        if let Some(retry) = self.retry {
            config.retry.enabled = retry;
        }
        if let Some(count) = self.retry_count {
            config.retry.count = count;
        }
        if let Some(ref delay) = self.retry_delay {
            config.retry.delay = parse_duration_seconds("retry-delay", delay)?;
        }
        if let Some(ref dedup) = self.dedup {
            config.dedup = Some(parse_duration_seconds("dedup", dedup)?);
        }
        if let Some(ref timeout) = self.timeout {
            config.timeout = parse_duration_seconds("timeout", timeout)?;
        }
        if let Some(ref tag) = self.tag {
            config.tag = tag.clone();
        }
        if let Some(ref host) = self.redis_host {
            config.store.host = host.clone();
        }
        if let Some(ref pass) = self.redis_pass {
            config.store.pass = Some(pass.clone());
        }
        if let Some(db) = self.redis_db {
            config.store.db = db;
        }
        if let Some(ref socket) = self.redis_socket {
            config.store.socket = Some(socket.clone());
        }
        if let Some(ref timeout) = self.redis_timeout {
            config.store.timeout = parse_duration_seconds("redis-timeout", timeout)?;
        }
        if let Some(ref sleep) = self.period_test_sleep {
            config.period_test.sleep = parse_duration_seconds("period-test-sleep", sleep)?;
        }
        if let Some(ref threshold) = self.period_test_threshold {
            config.period_test.threshold = parse_fraction("period-test-threshold", threshold)?;
        }
        if self.verbose > 0 {
            config.logging.level = verbosity_level(self.verbose).to_string();
        }
        Ok(())
    }
}

/// A CLI flag carried a value that could not be parsed into the shape the
/// underlying `Config` field expects.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for --{field}: {value}")]
pub struct ConfigOverrideError {
    field: String,
    value: String,
}

fn parse_duration_seconds(field: &str, value: &str) -> Result<DurationSeconds, ConfigOverrideError> {
    humantime::parse_duration(value)
        .map(|duration: Duration| DurationSeconds(duration.as_secs()))
        .map_err(|_| ConfigOverrideError {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn parse_fraction(field: &str, value: &str) -> Result<f64, ConfigOverrideError> {
    let trimmed = value.strip_suffix('%').unwrap_or(value);
    let parsed: f64 = trimmed.parse().map_err(|_| ConfigOverrideError {
        field: field.to_string(),
        value: value.to_string(),
    })?;
    let fraction = if value.ends_with('%') {
        parsed / 100.0
    } else {
        parsed
    };
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(ConfigOverrideError {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn verbosity_level(count: u8) -> &'static str {
    match count {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_defaults() -> Cli {
        Cli {
            command: None,
            parallel: None,
            ipv4: false,
            ipv6: false,
            retry: None,
            retry_count: None,
            retry_delay: None,
            dedup: None,
            timeout: None,
            tag: None,
            verbose: 0,
            redis_host: None,
            redis_pass: None,
            redis_db: None,
            redis_socket: None,
            redis_timeout: None,
            period_test_sleep: None,
            period_test_threshold: None,
        }
    }

    #[test]
    fn unset_flags_leave_config_untouched() {
        let cli = cli_with_defaults();
        let mut config = Config::default();
        let before = config.parallel;
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.parallel, before);
    }

    #[test]
    fn dedup_flag_parses_humantime_duration() {
        let mut cli = cli_with_defaults();
        cli.dedup = Some("5m".to_string());
        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.dedup.unwrap().as_duration(), Duration::from_secs(300));
    }

    #[test]
    fn period_test_threshold_accepts_percent_suffix() {
        let mut cli = cli_with_defaults();
        cli.period_test_threshold = Some("40%".to_string());
        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.period_test.threshold, 0.4);
    }

    #[test]
    fn verbose_flag_raises_log_level() {
        let mut cli = cli_with_defaults();
        cli.verbose = 2;
        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn invalid_duration_override_is_rejected() {
        let mut cli = cli_with_defaults();
        cli.timeout = Some("not-a-duration".to_string());
        let mut config = Config::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }
}
