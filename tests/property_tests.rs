//! Property-based tests over the DSL parser and sanitization, using
//! `proptest` the way the wider example pack does for pure, input-shaped
//! logic (no I/O, no async).

use std::sync::Arc;

use overseer::adapters::dsl::DslParser;
use overseer::adapters::protocols::register_builtin_handlers;
use overseer::domain::models::TestSpec;
use overseer::services::ProtocolRegistry;
use proptest::prelude::*;
use test_strategy::Arbitrary;

/// A structured, always-well-formed bare DSL line, generated field-by-field
/// so the grammar shape is guaranteed valid while the host and protocol
/// still vary freely. Deliberately has no `with key value` pairs: only
/// `tcp`'s `port` argument and the universal overrides (`dedup`, `timeout`,
/// ...) are accepted by the parser, so a pair built from unconstrained
/// strings would fail validation for reasons unrelated to what this test
/// checks.
#[derive(Debug, Clone, Arbitrary)]
struct StructuredDslLine {
    #[strategy("[a-z]{1,10}\\.[a-z]{2,6}")]
    host: String,
    #[strategy(prop::sample::select(vec!["tcp", "http", "dns"]))]
    test_type: &'static str,
}

impl StructuredDslLine {
    fn to_line(&self) -> String {
        format!("{} must run {}", self.host, self.test_type)
    }
}

fn registry() -> Arc<ProtocolRegistry> {
    let mut registry = ProtocolRegistry::default();
    register_builtin_handlers(&mut registry);
    Arc::new(registry)
}

fn spec_with_input(input: &str) -> TestSpec {
    TestSpec {
        input: input.to_string(),
        test_type: "http".to_string(),
        target: "example.com".to_string(),
        arguments: std::collections::BTreeMap::new(),
        timeout: None,
        max_retries: None,
        dedup_duration: None,
        max_targets_count: 0,
        period_duration: None,
        period_sleep: None,
        period_threshold: None,
    }
}

proptest! {
    /// Sanitizing an already-sanitized string never changes it further,
    /// regardless of how many password/non-password arguments precede it.
    #[test]
    fn sanitize_is_idempotent(pass_value in "[a-zA-Z0-9]{1,12}", prefix_args in prop::collection::vec("[a-z]{1,8} [a-z0-9]{1,8}", 0..4)) {
        let mut input = "example.com must run http".to_string();
        for pair in &prefix_args {
            input.push_str(" with ");
            input.push_str(pair);
        }
        input.push_str(" with password ");
        input.push_str(&pass_value);

        let once = spec_with_input(&input).sanitize();
        let twice = spec_with_input(&once).sanitize();
        prop_assert_eq!(once, twice);
    }

    /// The parser never panics on arbitrary whitespace-delimited token
    /// streams; it either returns a spec or a `ParseError`.
    #[test]
    fn parser_never_panics_on_arbitrary_tokens(tokens in prop::collection::vec("[a-zA-Z0-9.:/%-]{0,10}", 0..8)) {
        let line = tokens.join(" ");
        let parser = DslParser::new(registry());
        let _ = parser.parse(&line);
    }

    /// A well-formed bare line for a known protocol always parses, and the
    /// parsed target/test_type always echo the input tokens verbatim.
    #[test]
    fn well_formed_bare_http_line_always_parses(host in "[a-z]{1,10}\\.[a-z]{2,6}") {
        let line = format!("{host} must run http");
        let parser = DslParser::new(registry());
        let spec = parser.parse(&line).expect("well-formed line should parse");
        prop_assert_eq!(spec.target, host);
        prop_assert_eq!(spec.test_type, "http");
    }

    /// A well-formed bare line for any built-in protocol (not just `http`)
    /// always parses and echoes its host/protocol back unchanged.
    #[test]
    fn structured_dsl_line_always_parses(line in any::<StructuredDslLine>()) {
        let parser = DslParser::new(registry());
        let spec = parser.parse(&line.to_line()).expect("well-formed structured line should parse");
        prop_assert_eq!(spec.target, line.host.clone());
        prop_assert_eq!(spec.test_type, line.test_type);
    }
}
