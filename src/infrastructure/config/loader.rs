use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::domain::error::ConfigError;
use crate::domain::models::Config;

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration with the precedence (lowest to highest):
    /// 1. Programmatic defaults.
    /// 2. The YAML file named by the `OVERSEER` environment variable, if set.
    /// 3. `OVERSEER_`-prefixed environment variables (nested fields split on `__`).
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Ok(config_path) = std::env::var("OVERSEER") {
            figment = figment.merge(Yaml::file(config_path));
        }

        let config: Config = figment
            .merge(Env::prefixed("OVERSEER_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Loads configuration from an explicit file path, bypassing the
    /// `OVERSEER` environment variable lookup. Used by tests.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("OVERSEER_").split("__"))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validates invariants `figment` cannot express through defaults alone.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.parallel == 0 {
            return Err(ConfigError::Invalid(
                "parallel must be at least 1".to_string(),
            ));
        }

        if !config.ipv4 && !config.ipv6 {
            return Err(ConfigError::Invalid(
                "at least one of ipv4/ipv6 must be enabled".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "invalid log level: {}",
                config.logging.level
            )));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "invalid log format: {}",
                config.logging.format
            )));
        }

        if !(0.0..=1.0).contains(&config.period_test.threshold) {
            return Err(ConfigError::Invalid(
                "period_test.threshold must be within 0.0..=1.0".to_string(),
            ));
        }

        if config.metrics.enabled && config.metrics.host.is_none() {
            return Err(ConfigError::Invalid(
                "metrics.enabled requires metrics.host".to_string(),
            ));
        }

        Ok(())
    }
}
