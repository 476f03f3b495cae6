//! Result store port: publishing results and reading/writing dedup state.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::StoreError;
use crate::domain::models::{Fingerprint, TestResult};

/// Publishes result records and manages per-fingerprint dedup state in the
/// shared queue/key-value store.
///
/// All operations are best-effort: a failure to reach the store is
/// returned as an `Err`, logged by the caller, and never panics the
/// worker. A null-object implementation (`adapters::memory` with no
/// backing, or a future `NoopResultStore`) satisfies this contract for
/// dry-run modes by treating every operation as a no-op success.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Appends the JSON encoding of `result` to the result queue.
    async fn publish(&self, result: &TestResult) -> Result<(), StoreError>;

    /// Reads the `cache-time` dedup key for `fp`, if set.
    async fn get_dedup_cache_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError>;

    /// Sets the `cache-time` dedup key for `fp` with the given TTL.
    async fn set_dedup_cache_time(
        &self,
        fp: Fingerprint,
        value: i64,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Deletes the `cache-time` dedup key for `fp`.
    async fn clear_dedup_cache_time(&self, fp: Fingerprint) -> Result<(), StoreError>;

    /// Reads the `last-alert-time` dedup key for `fp`, if set.
    async fn get_last_alert_time(&self, fp: Fingerprint) -> Result<Option<i64>, StoreError>;

    /// Sets the `last-alert-time` dedup key for `fp` with the given TTL.
    async fn set_last_alert_time(
        &self,
        fp: Fingerprint,
        value: i64,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Deletes the `last-alert-time` dedup key for `fp`.
    async fn clear_last_alert_time(&self, fp: Fingerprint) -> Result<(), StoreError>;
}
