//! Worker pool: bounded-parallelism queue polling with graceful shutdown
//! and in-flight requeue (§4.5, §5, §9).
//!
//! Each slot is an independent `tokio::spawn`ed task so the pool can force
//! termination of a still-running slot via `JoinHandle::abort` on a second
//! shutdown signal. Graceful shutdown is a `broadcast` channel observed at
//! two checkpoints: before popping (folded into the `select!` below via
//! `biased`, so a pending shutdown always wins over a fresh pop) and after
//! popping but before executing, where a popped-but-unexecuted job is
//! requeued to the tail of the job queue.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use crate::adapters::dsl::DslParser;
use crate::application::test_executor::TestExecutor;
use crate::domain::error::StoreError;
use crate::domain::ports::JobQueue;
use crate::services::ProtocolRegistry;

/// `Parallel` worker slots sharing one job queue and executor instance.
pub struct WorkerPool {
    parallel: usize,
    job_queue: Arc<dyn JobQueue>,
    registry: Arc<ProtocolRegistry>,
    executor: Arc<TestExecutor>,
    shutdown_tx: broadcast::Sender<()>,
}

impl WorkerPool {
    /// Builds a pool of `parallel` slots over the given queue, registry,
    /// and executor.
    pub fn new(
        parallel: usize,
        job_queue: Arc<dyn JobQueue>,
        registry: Arc<ProtocolRegistry>,
        executor: Arc<TestExecutor>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            parallel,
            job_queue,
            registry,
            executor,
            shutdown_tx,
        }
    }

    /// Startup precondition: the job queue must be reachable before the
    /// pool enters service.
    pub async fn ensure_queue_reachable(&self) -> Result<(), StoreError> {
        self.job_queue.ping().await
    }

    /// Broadcasts the shutdown signal once; slots observe it at their next
    /// checkpoint. Idempotent-ish: a second call is how the caller
    /// implements the "second signal forces immediate exit" escape hatch,
    /// though that path is actually driven by aborting the returned
    /// `JoinHandle`s, not by this method.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Spawns `parallel` slot tasks under `worker_tag`-prefixed ids and
    /// returns their handles so the caller can await graceful completion
    /// or `abort()` them on a forced shutdown.
    pub fn spawn(&self, worker_tag: &str) -> Vec<JoinHandle<()>> {
        (0..self.parallel)
            .map(|slot| {
                let worker_id = format!("{worker_tag}-{slot}");
                let job_queue = Arc::clone(&self.job_queue);
                let registry = Arc::clone(&self.registry);
                let executor = Arc::clone(&self.executor);
                let shutdown_rx = self.shutdown_tx.subscribe();
                tokio::spawn(run_slot(worker_id, job_queue, registry, executor, shutdown_rx))
            })
            .collect()
    }
}

/// Awaits every slot handle to graceful completion.
pub async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(err) = handle.await {
            if !err.is_cancelled() {
                warn!(%err, "worker slot panicked");
            }
        }
    }
}

#[instrument(skip(job_queue, registry, executor, shutdown_rx), fields(worker_id = %worker_id))]
async fn run_slot(
    worker_id: String,
    job_queue: Arc<dyn JobQueue>,
    registry: Arc<ProtocolRegistry>,
    executor: Arc<TestExecutor>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let parser = DslParser::new(registry);

    loop {
        let payload = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown signaled, exiting slot before next pop");
                return;
            }
            popped = job_queue.blocking_pop() => {
                match popped {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(%err, "job queue pop failed");
                        continue;
                    }
                }
            }
        };

        if shutdown_rx.try_recv().is_ok() {
            tracing::info!("shutdown signaled after pop, requeuing job");
            if let Err(err) = job_queue.push(&payload).await {
                warn!(%err, "failed to requeue job on shutdown");
            }
            return;
        }

        match parser.parse(&payload) {
            Ok(spec) => executor.execute(&worker_id, &spec).await,
            Err(err) => warn!(%err, payload = %payload, "discarding unparsable job"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::adapters::memory::{MemoryJobQueue, MemoryResultStore};
    use crate::adapters::protocols::register_builtin_handlers;
    use crate::application::test_executor::ExecutorOptions;
    use crate::domain::error::HandlerError;
    use crate::domain::models::TestSpec;
    use crate::domain::ports::{ArgumentPattern, HandlerOptions, NullMetricsSink, ProtocolHandler};
    use std::collections::BTreeMap;

    struct AlwaysOk;

    #[async_trait]
    impl ProtocolHandler for AlwaysOk {
        fn name(&self) -> &'static str {
            "always-ok"
        }
        fn arguments(&self) -> BTreeMap<&'static str, ArgumentPattern> {
            BTreeMap::new()
        }
        fn should_resolve_hostname(&self) -> bool {
            false
        }
        fn example(&self) -> &'static str {
            "x must run always-ok"
        }
        async fn run_test(
            &self,
            _spec: &TestSpec,
            _probed_target: &str,
            _options: HandlerOptions,
        ) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    fn test_options() -> ExecutorOptions {
        ExecutorOptions {
            ipv4: true,
            ipv6: false,
            retry_enabled: true,
            retry_count: 2,
            retry_delay: Duration::from_millis(1),
            default_timeout: Duration::from_secs(1),
            default_dedup: None,
            tag: "t1".to_string(),
            period_sleep_default: Duration::from_secs(1),
            period_threshold_default: 0.0,
        }
    }

    #[tokio::test]
    async fn shutdown_before_pop_requeues_nothing_and_exits() {
        let mut registry = ProtocolRegistry::default();
        register_builtin_handlers(&mut registry);
        registry.register("always-ok", Box::new(|| Box::new(AlwaysOk)));
        let registry = Arc::new(registry);

        let job_queue: Arc<dyn JobQueue> = Arc::new(MemoryJobQueue::new());
        let result_store = Arc::new(MemoryResultStore::new());
        let executor = Arc::new(TestExecutor::new(
            Arc::clone(&registry),
            result_store,
            Arc::new(NullMetricsSink),
            test_options(),
        ));

        let pool = WorkerPool::new(1, Arc::clone(&job_queue), registry, executor);
        pool.request_shutdown();
        let handles = pool.spawn("w");
        join_all(handles).await;
        // No job was ever pushed, so the queue remains empty either way;
        // this mainly asserts the slot exits promptly rather than hanging.
    }

    #[tokio::test]
    async fn shutdown_after_pop_requeues_the_job() {
        let mut registry = ProtocolRegistry::default();
        register_builtin_handlers(&mut registry);
        let registry = Arc::new(registry);

        let memory_queue = Arc::new(MemoryJobQueue::new());
        memory_queue
            .push("example.com must run http")
            .await
            .unwrap();
        let job_queue: Arc<dyn JobQueue> = memory_queue.clone();

        let result_store = Arc::new(MemoryResultStore::new());
        let executor = Arc::new(TestExecutor::new(
            Arc::clone(&registry),
            result_store,
            Arc::new(NullMetricsSink),
            test_options(),
        ));

        let pool = WorkerPool::new(1, job_queue, registry, executor);
        // Signal shutdown immediately after spawning; the race between the
        // pop and the broadcast send is inherent, so this test only
        // asserts the slot terminates, not which checkpoint fired.
        let handles = pool.spawn("w");
        pool.request_shutdown();
        join_all(handles).await;
    }
}
