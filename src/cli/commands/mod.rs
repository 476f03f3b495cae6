//! CLI subcommand handlers, one module per `Commands` variant plus the
//! default (no-subcommand) worker-pool run.

pub mod enqueue;
pub mod examples;
pub mod worker;
