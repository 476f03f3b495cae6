//! Redis-backed result/dedup store, per §6's key naming.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::error::StoreError;
use crate::domain::models::{Fingerprint, TestResult};
use crate::domain::ports::ResultStore;

const RESULTS_KEY: &str = "overseer.results";

fn cache_time_key(fp: Fingerprint) -> String {
    format!("overseer.dedup-cache.{fp}")
}

fn last_alert_key(fp: Fingerprint) -> String {
    format!("overseer.dedup-last-alert.{fp}")
}

/// Redis-backed result publication and dedup-state store.
#[derive(Clone)]
pub struct RedisResultStore {
    conn: ConnectionManager,
}

impl RedisResultStore {
    /// Wraps an existing connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    async fn get_key(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|err| StoreError::OperationFailed(err.to_string()))
    }

    async fn set_key(&self, key: &str, value: i64, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|err| StoreError::OperationFailed(err.to_string()))
    }

    async fn clear_key(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|err| StoreError::OperationFailed(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ResultStore for RedisResultStore {
    async fn publish(&self, result: &TestResult) -> Result<(), StoreError> {
        let payload = serde_json::to_string(result)
            .map_err(|err| StoreError::OperationFailed(err.to_string()))?;
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(RESULTS_KEY, payload)
            .await
            .map_err(|err| StoreError::OperationFailed(err.to_string()))
    }

    async fn get_dedup_cache_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError> {
        self.get_key(&cache_time_key(fp)).await
    }

    async fn set_dedup_cache_time(
        &self,
        fp: Fingerprint,
        value: i64,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.set_key(&cache_time_key(fp), value, ttl).await
    }

    async fn clear_dedup_cache_time(&self, fp: Fingerprint) -> Result<(), StoreError> {
        self.clear_key(&cache_time_key(fp)).await
    }

    async fn get_last_alert_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError> {
        self.get_key(&last_alert_key(fp)).await
    }

    async fn set_last_alert_time(
        &self,
        fp: Fingerprint,
        value: i64,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.set_key(&last_alert_key(fp), value, ttl).await
    }

    async fn clear_last_alert_time(&self, fp: Fingerprint) -> Result<(), StoreError> {
        self.clear_key(&last_alert_key(fp)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keys_use_hex_fingerprint() {
        let fp = Fingerprint::of("example.com must run http");
        assert_eq!(
            cache_time_key(fp),
            format!("overseer.dedup-cache.{}", fp.as_hex())
        );
        assert_eq!(
            last_alert_key(fp),
            format!("overseer.dedup-last-alert.{}", fp.as_hex())
        );
    }
}
