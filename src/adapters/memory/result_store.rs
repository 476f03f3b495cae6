//! In-process result store backed by a `Mutex`-guarded map and a result log.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::error::StoreError;
use crate::domain::models::{Fingerprint, TestResult};
use crate::domain::ports::ResultStore;

#[derive(Default)]
struct Inner {
    published: Vec<TestResult>,
    cache_time: HashMap<Fingerprint, i64>,
    last_alert_time: HashMap<Fingerprint, i64>,
}

/// An in-memory stand-in for the Redis-backed result/dedup store. TTLs are
/// accepted but not enforced; tests that care about expiry call
/// `clear_dedup_cache_time`/`clear_last_alert_time` explicitly instead of
/// waiting out a TTL.
#[derive(Default)]
pub struct MemoryResultStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryResultStore {
    /// Builds an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every result published so far, in publish order. Used by
    /// tests to assert on the emitted result stream.
    pub async fn published(&self) -> Vec<TestResult> {
        self.inner.lock().await.published.clone()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn publish(&self, result: &TestResult) -> Result<(), StoreError> {
        self.inner.lock().await.published.push(result.clone());
        Ok(())
    }

    async fn get_dedup_cache_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().await.cache_time.get(&fp).copied())
    }

    async fn set_dedup_cache_time(
        &self,
        fp: Fingerprint,
        value: i64,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        self.inner.lock().await.cache_time.insert(fp, value);
        Ok(())
    }

    async fn clear_dedup_cache_time(&self, fp: Fingerprint) -> Result<(), StoreError> {
        self.inner.lock().await.cache_time.remove(&fp);
        Ok(())
    }

    async fn get_last_alert_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().await.last_alert_time.get(&fp).copied())
    }

    async fn set_last_alert_time(
        &self,
        fp: Fingerprint,
        value: i64,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        self.inner.lock().await.last_alert_time.insert(fp, value);
        Ok(())
    }

    async fn clear_last_alert_time(&self, fp: Fingerprint) -> Result<(), StoreError> {
        self.inner.lock().await.last_alert_time.remove(&fp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_appends_to_log() {
        let store = MemoryResultStore::new();
        let result = TestResult::new("x", "1.2.3.4", "tcp", 0, "t", None);
        store.publish(&result).await.unwrap();
        assert_eq!(store.published().await, vec![result]);
    }

    #[tokio::test]
    async fn dedup_keys_round_trip_and_clear() {
        let store = MemoryResultStore::new();
        let fp = Fingerprint::of("example.com must run http");

        assert_eq!(store.get_dedup_cache_time(fp).await.unwrap(), None);
        store
            .set_dedup_cache_time(fp, 100, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get_dedup_cache_time(fp).await.unwrap(), Some(100));

        store.clear_dedup_cache_time(fp).await.unwrap();
        assert_eq!(store.get_dedup_cache_time(fp).await.unwrap(), None);
    }
}
