//! In-process FIFO job queue backed by a `Mutex<VecDeque<String>>`.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::error::StoreError;
use crate::domain::ports::JobQueue;

/// An in-memory stand-in for the Redis-backed job queue. Blocking pop is
/// implemented with a `Notify` rather than polling: `push` wakes exactly
/// one waiter, and a waiter that loses a race simply re-checks the queue.
#[derive(Default)]
pub struct MemoryJobQueue {
    queue: Arc<Mutex<VecDeque<String>>>,
    notify: Arc<Notify>,
}

impl MemoryJobQueue {
    /// Builds an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current queue depth; used by tests to assert requeue behavior.
    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Whether the queue currently holds no jobs.
    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn push(&self, payload: &str) -> Result<(), StoreError> {
        self.queue.lock().await.push_back(payload.to_string());
        self.notify.notify_one();
        Ok(())
    }

    async fn blocking_pop(&self) -> Result<String, StoreError> {
        loop {
            {
                let mut queue = self.queue.lock().await;
                if let Some(payload) = queue.pop_front() {
                    return Ok(payload);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn push_then_pop_returns_fifo_order() {
        let queue = MemoryJobQueue::new();
        queue.push("first").await.unwrap();
        queue.push("second").await.unwrap();

        assert_eq!(queue.blocking_pop().await.unwrap(), "first");
        assert_eq!(queue.blocking_pop().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn blocking_pop_waits_for_a_push() {
        let queue = Arc::new(MemoryJobQueue::new());
        let popper = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.blocking_pop().await.unwrap() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push("late arrival").await.unwrap();

        let payload = tokio::time::timeout(Duration::from_secs(1), popper)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload, "late arrival");
    }

    #[tokio::test]
    async fn ping_always_succeeds() {
        let queue = MemoryJobQueue::new();
        assert!(queue.ping().await.is_ok());
    }
}
