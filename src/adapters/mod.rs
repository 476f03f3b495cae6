//! Concrete adapters for the domain's ports: in-memory (tests, dry-run),
//! Redis-backed (production), the test-DSL parser, and the built-in
//! protocol handlers.

pub mod dsl;
pub mod memory;
pub mod protocols;
pub mod redis;
