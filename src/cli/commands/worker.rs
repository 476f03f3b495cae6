//! Default entry point (no subcommand): runs the worker pool to completion.
//!
//! Signal handling is grounded in the teacher's `mcp_process_manager`
//! shutdown sequence (SIGTERM to children, forced kill after a timeout) and
//! its `nix` dependency, adapted to `tokio::signal::unix` since the teacher
//! itself manages child *processes* rather than its own signal mask. The
//! first SIGINT/SIGTERM requests a graceful drain via the worker pool's
//! broadcast channel; a second forces immediate termination by aborting
//! every slot's `JoinHandle`.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::application::worker_pool::join_all;
use crate::application::{TestExecutor, WorkerPool};
use crate::domain::models::Config;
use crate::{executor_options, Context};

/// Builds the executor and worker pool from `config`/`ctx` and runs until a
/// shutdown signal drains it (or a second signal aborts it).
pub async fn run(config: Config, ctx: Context) -> Result<()> {
    let executor = Arc::new(TestExecutor::new(
        Arc::clone(&ctx.registry),
        Arc::clone(&ctx.result_store),
        Arc::clone(&ctx.metrics),
        executor_options(&config),
    ));

    let pool = WorkerPool::new(
        config.parallel,
        Arc::clone(&ctx.job_queue),
        Arc::clone(&ctx.registry),
        executor,
    );

    pool.ensure_queue_reachable()
        .await
        .context("job queue unreachable at startup")?;

    let handles = pool.spawn(&config.tag);
    let abort_handles: Vec<_> = handles.iter().map(|handle| handle.abort_handle()).collect();

    info!(parallel = config.parallel, tag = %config.tag, "worker pool started");

    let signal_name = wait_for_shutdown_signal().await?;
    info!(signal = %signal_name, "shutdown signal received, draining in-flight jobs");
    pool.request_shutdown();

    tokio::select! {
        () = join_all(handles) => {
            info!("all worker slots exited cleanly");
        }
        second = wait_for_shutdown_signal() => {
            match second {
                Ok(signal_name) => warn!(signal = %signal_name, "second shutdown signal received, aborting in-flight slots"),
                Err(err) => warn!(%err, "failed waiting for a second shutdown signal, aborting in-flight slots anyway"),
            }
            for handle in &abort_handles {
                handle.abort();
            }
        }
    }

    Ok(())
}

/// Waits for SIGINT or SIGTERM. The returned `Signal` is used only for its
/// `Display` impl when logging which one fired.
async fn wait_for_shutdown_signal() -> Result<Signal> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    tokio::select! {
        _ = sigterm.recv() => Ok(Signal::SIGTERM),
        _ = sigint.recv() => Ok(Signal::SIGINT),
    }
}
