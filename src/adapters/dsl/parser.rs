//! Test-DSL parser: `<target> must run <type> [with <key> <value>]*`.
//!
//! The grammar is derived from the concrete example lines this system is
//! specified against (`https://example.com must run http`, `... must run
//! http with dedup 5m`, `dumb must run dumb-test with pt-duration 5s with
//! pt-sleep 1s with pt-threshold 40%`); no upstream grammar document
//! survived retrieval, so this is the one place this crate makes a grammar
//! decision rather than following one (see DESIGN.md).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::error::ParseError;
use crate::domain::models::TestSpec;
use crate::services::ProtocolRegistry;

/// Parses test-DSL lines into `TestSpec`s, validating handler-specific
/// arguments against the protocol registry as it goes.
///
/// Holds an `Arc` rather than a borrow so one parser can be shared across
/// the worker pool's spawned slot tasks.
pub struct DslParser {
    registry: Arc<ProtocolRegistry>,
}

impl DslParser {
    /// Builds a parser backed by `registry`.
    pub fn new(registry: Arc<ProtocolRegistry>) -> Self {
        Self { registry }
    }

    /// Parses one line. Leading/trailing whitespace is trimmed; the rest of
    /// the grammar is whitespace-token-delimited.
    pub fn parse(&self, line: &str) -> Result<TestSpec, ParseError> {
        let input = line.trim().to_string();
        let mut tokens = input.split_whitespace();

        let target = tokens
            .next()
            .ok_or_else(|| ParseError::Malformed(input.clone()))?
            .to_string();

        let must = tokens.next();
        let run = tokens.next();
        if must != Some("must") || run != Some("run") {
            return Err(ParseError::Malformed(input));
        }

        let test_type = tokens
            .next()
            .ok_or_else(|| ParseError::Malformed(input.clone()))?
            .to_string();

        let handler = self
            .registry
            .build(&test_type)
            .ok_or_else(|| ParseError::UnknownProtocol(test_type.clone()))?;
        let known_arguments = handler.arguments();

        let mut spec = TestSpec {
            input: input.clone(),
            test_type,
            target,
            arguments: BTreeMap::new(),
            timeout: None,
            max_retries: None,
            dedup_duration: None,
            max_targets_count: 0,
            period_duration: None,
            period_sleep: None,
            period_threshold: None,
        };

        loop {
            match tokens.next() {
                None => break,
                Some("with") => {}
                Some(_) => return Err(ParseError::Malformed(input)),
            }

            let key = tokens
                .next()
                .ok_or_else(|| ParseError::Malformed(input.clone()))?;
            let value = tokens
                .next()
                .ok_or_else(|| ParseError::Malformed(input.clone()))?;

            match key {
                "timeout" => spec.timeout = Some(parse_duration(key, value)?),
                "max-retries" | "retry" => {
                    spec.max_retries = Some(value.parse().map_err(|_| {
                        ParseError::InvalidOverride {
                            field: key.to_string(),
                            value: value.to_string(),
                        }
                    })?);
                }
                "dedup" => spec.dedup_duration = Some(parse_duration(key, value)?),
                "max-targets" => {
                    spec.max_targets_count = value.parse().map_err(|_| {
                        ParseError::InvalidOverride {
                            field: key.to_string(),
                            value: value.to_string(),
                        }
                    })?;
                }
                "pt-duration" | "period-test-duration" => {
                    spec.period_duration = Some(parse_duration(key, value)?);
                }
                "pt-sleep" | "period-test-sleep" => {
                    spec.period_sleep = Some(parse_duration(key, value)?);
                }
                "pt-threshold" | "period-test-threshold" => {
                    spec.period_threshold = Some(parse_percentage(key, value)?);
                }
                _ => {
                    let pattern = known_arguments.get(key).ok_or_else(|| {
                        ParseError::InvalidArgument {
                            arg: key.to_string(),
                            value: value.to_string(),
                        }
                    })?;
                    if !pattern.matches(value) {
                        return Err(ParseError::InvalidArgument {
                            arg: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                    spec.arguments.insert(key.to_string(), value.to_string());
                }
            }
        }

        Ok(spec)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ParseError> {
    humantime::parse_duration(value).map_err(|_| ParseError::InvalidOverride {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_percentage(field: &str, value: &str) -> Result<f64, ParseError> {
    let trimmed = value.strip_suffix('%').unwrap_or(value);
    let parsed: f64 = trimmed.parse().map_err(|_| ParseError::InvalidOverride {
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
        Err(ParseError::InvalidOverride {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::protocols::register_builtin_handlers;

    fn registry() -> Arc<ProtocolRegistry> {
        let mut registry = ProtocolRegistry::default();
        register_builtin_handlers(&mut registry);
        Arc::new(registry)
    }

    #[test]
    fn parses_a_bare_http_line() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        let spec = parser.parse("https://example.com must run http").unwrap();
        assert_eq!(spec.test_type, "http");
        assert_eq!(spec.target, "https://example.com");
        assert!(spec.dedup_duration.is_none());
    }

    #[test]
    fn parses_dedup_override_as_duration() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        let spec = parser
            .parse("https://example.com must run http with dedup 5m")
            .unwrap();
        assert_eq!(spec.dedup_duration, Some(Duration::from_secs(300)));
    }

    #[test]
    fn accepts_short_and_long_period_test_keys_identically() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        let short = parser
            .parse("dumb must run tcp with port 1 with pt-duration 5s with pt-sleep 1s with pt-threshold 40%")
            .unwrap();
        let long = parser
            .parse("dumb must run tcp with port 1 with period-test-duration 5s with period-test-sleep 1s with period-test-threshold 40%")
            .unwrap();
        assert_eq!(short.period_duration, long.period_duration);
        assert_eq!(short.period_sleep, long.period_sleep);
        assert_eq!(short.period_threshold, long.period_threshold);
        assert_eq!(short.period_threshold, Some(0.4));
    }

    #[test]
    fn rejects_unknown_protocol() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        let err = parser.parse("example.com must run ssh2").unwrap_err();
        assert_eq!(err, ParseError::UnknownProtocol("ssh2".to_string()));
    }

    #[test]
    fn rejects_malformed_grammar() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        assert!(parser.parse("example.com should run http").is_err());
    }

    #[test]
    fn validates_handler_specific_arguments_against_pattern() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        assert!(parser
            .parse("example.com must run tcp with port not-a-number")
            .is_err());
        let ok = parser.parse("example.com must run tcp with port 443").unwrap();
        assert_eq!(ok.arguments.get("port"), Some(&"443".to_string()));
    }

    #[test]
    fn parses_retry_short_alias() {
        let registry = registry();
        let parser = DslParser::new(registry.clone());
        let spec = parser
            .parse("example.com must run http with retry 5")
            .unwrap();
        assert_eq!(spec.max_retries, Some(5));
    }
}
