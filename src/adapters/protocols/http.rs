//! Built-in `http` protocol handler: issues a GET and checks the status code.
//!
//! Does not resolve hostnames itself — the full URL is handed to `reqwest`,
//! which performs its own resolution. This mirrors handlers whose underlying
//! library manages addressing, and is why `probed_target` is unused here:
//! the executor passes the spec's own `target` through unchanged.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::error::HandlerError;
use crate::domain::models::TestSpec;
use crate::domain::ports::{ArgumentPattern, HandlerOptions, ProtocolHandler};

const DEFAULT_EXPECT_STATUS: u16 = 200;

/// Issues an HTTP GET against `spec.target` and checks the response status.
#[derive(Debug, Default)]
pub struct HttpHandler;

#[async_trait]
impl ProtocolHandler for HttpHandler {
    fn name(&self) -> &'static str {
        "http"
    }

    fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern> {
        BTreeMap::from([("expect-status", ArgumentPattern::UnsignedInt)])
    }

    fn should_resolve_hostname(&self) -> bool {
        false
    }

    fn example(&self) -> &'static str {
        "https://example.com must run http with expect-status 200"
    }

    async fn run_test(
        &self,
        spec: &TestSpec,
        _probed_target: &str,
        options: HandlerOptions,
    ) -> Result<(), HandlerError> {
        let expect_status: u16 = match spec.arguments.get("expect-status") {
            Some(value) => value
                .parse()
                .map_err(|_| HandlerError::Failed(format!("invalid expect-status: {value}")))?,
            None => DEFAULT_EXPECT_STATUS,
        };

        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|err| HandlerError::Failed(format!("failed to build http client: {err}")))?;

        let response = tokio::time::timeout(options.timeout, client.get(&spec.target).send())
            .await
            .map_err(|_| HandlerError::Timeout(options.timeout))?
            .map_err(|err| HandlerError::Failed(format!("request to {} failed: {err}", spec.target)))?;

        let status = response.status().as_u16();
        if status == expect_status {
            Ok(())
        } else {
            Err(HandlerError::Failed(format!(
                "expected status {expect_status}, got {status}"
            )))
        }
    }
}
