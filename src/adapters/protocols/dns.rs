//! Built-in `dns` protocol handler: resolves `probed_target` and checks for
//! a non-empty answer of the requested record type.
//!
//! This is the one built-in handler where resolution *is* the probe, so the
//! executor's own pre-resolution (run because `should_resolve_hostname()`
//! is true) and this handler's lookup are both exercised for every
//! invocation. That double-resolution is redundant but harmless, and is
//! intentional rather than an oversight — see DESIGN.md.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;

use crate::domain::error::HandlerError;
use crate::domain::models::TestSpec;
use crate::domain::ports::{ArgumentPattern, HandlerOptions, ProtocolHandler};

const DEFAULT_RECORD: &str = "a";

/// Resolves `probed_target` and checks for an answer of the requested
/// address family.
#[derive(Debug, Default)]
pub struct DnsHandler;

#[async_trait]
impl ProtocolHandler for DnsHandler {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern> {
        BTreeMap::from([("record", ArgumentPattern::OneOf(&["a", "aaaa"]))])
    }

    fn should_resolve_hostname(&self) -> bool {
        true
    }

    fn example(&self) -> &'static str {
        "example.com must run dns with record aaaa"
    }

    async fn run_test(
        &self,
        spec: &TestSpec,
        probed_target: &str,
        options: HandlerOptions,
    ) -> Result<(), HandlerError> {
        let record = spec
            .arguments
            .get("record")
            .map(String::as_str)
            .unwrap_or(DEFAULT_RECORD);
        let want_ipv6 = record == "aaaa";

        let lookup = format!("{probed_target}:0");
        let addrs: Vec<IpAddr> = tokio::time::timeout(options.timeout, tokio::net::lookup_host(lookup))
            .await
            .map_err(|_| HandlerError::Timeout(options.timeout))?
            .map_err(|err| HandlerError::Failed(format!("resolution of {probed_target} failed: {err}")))?
            .map(|addr: SocketAddr| addr.ip())
            .filter(|ip| ip.is_ipv6() == want_ipv6)
            .collect();

        if addrs.is_empty() {
            Err(HandlerError::Failed(format!(
                "no {record} records found for {probed_target}"
            )))
        } else {
            Ok(())
        }
    }
}
