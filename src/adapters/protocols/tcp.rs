//! Built-in `tcp` protocol handler: connects to `probed_target:port`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::domain::error::HandlerError;
use crate::domain::models::TestSpec;
use crate::domain::ports::{ArgumentPattern, HandlerOptions, ProtocolHandler};

/// Opens a TCP connection to `probed_target:port` within the handler timeout.
#[derive(Debug, Default)]
pub struct TcpHandler;

#[async_trait]
impl ProtocolHandler for TcpHandler {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern> {
        BTreeMap::from([("port", ArgumentPattern::UnsignedInt)])
    }

    fn should_resolve_hostname(&self) -> bool {
        true
    }

    fn example(&self) -> &'static str {
        "example.com must run tcp with port 443"
    }

    async fn run_test(
        &self,
        spec: &TestSpec,
        probed_target: &str,
        options: HandlerOptions,
    ) -> Result<(), HandlerError> {
        let port: u16 = spec
            .arguments
            .get("port")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| HandlerError::Failed("missing or invalid port argument".to_string()))?;

        let addr = format!("{probed_target}:{port}");
        match tokio::time::timeout(options.timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(err)) => Err(HandlerError::Failed(format!("connect to {addr} failed: {err}"))),
            Err(_) => Err(HandlerError::Timeout(options.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap as Map;
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    fn spec_with_port(port: u16) -> TestSpec {
        let mut arguments = Map::new();
        arguments.insert("port".to_string(), port.to_string());
        TestSpec {
            input: "127.0.0.1 must run tcp".to_string(),
            test_type: "tcp".to_string(),
            target: "127.0.0.1".to_string(),
            arguments,
            timeout: None,
            max_retries: None,
            dedup_duration: None,
            max_targets_count: 0,
            period_duration: None,
            period_sleep: None,
            period_threshold: None,
        }
    }

    #[tokio::test]
    async fn connects_successfully_to_an_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let handler = TcpHandler;
        let spec = spec_with_port(port);
        let options = HandlerOptions {
            timeout: Duration::from_secs(1),
        };
        assert!(handler.run_test(&spec, "127.0.0.1", options).await.is_ok());
    }

    #[tokio::test]
    async fn missing_port_argument_fails() {
        let handler = TcpHandler;
        let spec = TestSpec {
            input: "127.0.0.1 must run tcp".to_string(),
            test_type: "tcp".to_string(),
            target: "127.0.0.1".to_string(),
            arguments: Map::new(),
            timeout: None,
            max_retries: None,
            dedup_duration: None,
            max_targets_count: 0,
            period_duration: None,
            period_sleep: None,
            period_threshold: None,
        };
        let options = HandlerOptions {
            timeout: Duration::from_secs(1),
        };
        assert!(handler.run_test(&spec, "127.0.0.1", options).await.is_err());
    }

    #[test]
    fn declares_resolve_hostname_and_port_argument() {
        let handler = TcpHandler;
        assert!(handler.should_resolve_hostname());
        assert_eq!(
            handler.arguments().get("port"),
            Some(&ArgumentPattern::UnsignedInt)
        );
    }
}
