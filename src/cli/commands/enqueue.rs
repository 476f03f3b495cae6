//! `enqueue` subcommand: validates one test-DSL line and pushes it onto the
//! job queue.

use anyhow::{Context as _, Result};

use crate::adapters::dsl::DslParser;
use crate::Context;

/// Parses `line` against the registered protocol handlers (so a typo fails
/// fast instead of silently poisoning a worker's pop loop later) and pushes
/// it onto the job queue.
pub async fn run(ctx: Context, line: String) -> Result<()> {
    let parser = DslParser::new(ctx.registry.clone());
    let spec = parser
        .parse(&line)
        .with_context(|| format!("not a valid test-DSL line: {line}"))?;

    ctx.job_queue
        .push(&line)
        .await
        .context("failed to push job onto the queue")?;

    println!("enqueued: {} must run {}", spec.target, spec.test_type);
    Ok(())
}
