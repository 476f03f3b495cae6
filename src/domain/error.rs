//! Domain error types for the Overseer probing system.
//!
//! Each error enum represents errors from a specific domain or infrastructure
//! concern. Handler and store failures never escape the executor as Rust
//! errors — they are converted into `Result` records (see `domain::models::result`)
//! or log lines, per the crate's error handling policy.

use thiserror::Error;

/// Errors surfaced by a `ProtocolHandler::run_test` invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler's own timeout elapsed before completion.
    #[error("handler timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The handler ran and determined the probe failed.
    #[error("{0}")]
    Failed(String),

    /// The handler panicked; caught at the executor boundary.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Errors related to resolving a `TestSpec`'s target to probeable addresses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// DNS lookup for the given host failed.
    #[error("failed to resolve name {0}")]
    LookupFailed(String),

    /// The target looked like a URL but could not be parsed.
    #[error("invalid target URL: {0}")]
    InvalidUrl(String),

    /// Resolution succeeded but no address survived the address-family filter.
    #[error("no {0} addresses found for {1}")]
    NoAddressesForFamily(&'static str, String),
}

/// Errors related to the queue/dedup backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached at all.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// An individual operation against a reachable store failed.
    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

impl StoreError {
    /// Returns true if this failure is likely transient (worth a later retry).
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Errors raised while parsing a test-DSL payload into a `TestSpec`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not match the `<target> must run <type> [...]` grammar.
    #[error("malformed test line: {0}")]
    Malformed(String),

    /// The protocol named in the line has no registered handler.
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),

    /// An argument value failed the handler's validation pattern.
    #[error("invalid value for argument {arg}: {value}")]
    InvalidArgument { arg: String, value: String },

    /// A well-known override (timeout, dedup, ...) had an unparsable value.
    #[error("invalid value for {field}: {value}")]
    InvalidOverride { field: String, value: String },
}

/// Errors related to configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required configuration field is missing or malformed.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// I/O error while reading the configuration file.
    #[error("I/O error reading config: {0}")]
    Io(String),
}
