//! Metrics publication infrastructure: a carbon-shaped UDP sink.

pub mod carbon;

pub use carbon::CarbonMetricsSink;
