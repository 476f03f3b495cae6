//! Redis-backed job queue: a list with blocking pop, per §6.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::error::StoreError;
use crate::domain::ports::JobQueue;

const JOBS_KEY: &str = "overseer.jobs";
const BLOCKING_POP_TIMEOUT_SECS: f64 = 1.0;

/// Redis-backed job queue shared across worker processes.
///
/// `blocking_pop` uses `BRPOP` with a short timeout rather than an
/// unbounded block so a worker can still observe the shutdown signal
/// between polls (§5, suspension point (i)).
#[derive(Clone)]
pub struct RedisJobQueue {
    conn: ConnectionManager,
}

impl RedisJobQueue {
    /// Wraps an existing connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl JobQueue for RedisJobQueue {
    async fn push(&self, payload: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(JOBS_KEY, payload)
            .await
            .map_err(|err| StoreError::OperationFailed(err.to_string()))
    }

    async fn blocking_pop(&self) -> Result<String, StoreError> {
        let mut conn = self.conn.clone();
        loop {
            let popped: Option<(String, String)> = conn
                .brpop(JOBS_KEY, BLOCKING_POP_TIMEOUT_SECS)
                .await
                .map_err(|err| StoreError::OperationFailed(err.to_string()))?;
            if let Some((_, payload)) = popped {
                return Ok(payload);
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| StoreError::Unreachable(err.to_string()))
    }
}
