//! Configuration management infrastructure.
//!
//! Hierarchical configuration using `figment`: programmatic defaults,
//! an optional YAML file named by the `OVERSEER` environment variable,
//! and `OVERSEER_`-prefixed environment variable overrides.

pub mod loader;

pub use loader::ConfigLoader;
