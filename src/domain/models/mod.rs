//! Domain models for the Overseer probing system.

pub mod config;
pub mod dedup;
pub mod result;
pub mod test_spec;

pub use config::Config;
pub use dedup::{DedupDecision, Fingerprint};
pub use result::TestResult;
pub use test_spec::{TestSpec, SENSITIVE_ARGUMENTS};
