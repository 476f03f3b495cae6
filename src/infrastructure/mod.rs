//! Infrastructure: the ambient stack (config, logging, metrics) that wraps
//! the domain/application layers but carries no business semantics.

pub mod config;
pub mod logging;
pub mod metrics;
