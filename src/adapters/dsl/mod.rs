//! Test-DSL parser turning job-queue payloads into `TestSpec`s (§4.6).

pub mod parser;

pub use parser::DslParser;
