//! Cache-aside store with TTL freshness and a bounded stale window.
//!
//! Read policy for a key of age `a`:
//! - `a <= ttl`: serve the cached payload as fresh, no upstream call.
//! - `ttl < a <= max_stale`: refresh synchronously; on failure serve
//!   the old payload marked stale.
//! - `a > max_stale`, or no entry at all: refresh synchronously; on
//!   failure the key is unavailable.
//!
//! Refreshes are single-flight per key: concurrent readers of the same
//! expired key coalesce onto one upstream call. Entries that age past
//! `max_stale` are dropped, together with their refresh locks, the next
//! time any read takes the refresh path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solarbudget_core::{CacheKey, Clock, PayloadSource, SolarBudgetError};
use solarbudget_types::{CachePolicyConfig, CacheStatus, KeyRefresh};
use tokio::sync::Mutex;

/// One cached upstream payload with its fetch instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Validated upstream payload, stored as opaque JSON.
    pub payload: serde_json::Value,
    /// When the payload was fetched successfully.
    pub fetched_at: DateTime<Utc>,
}

/// Storage behind the [`CacheStore`]. Swappable so tests and future
/// persistent backends share the read policy unchanged.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up the entry for `key`.
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;
    /// Insert or replace the entry for `key`.
    async fn put(&self, key: CacheKey, entry: CacheEntry);
    /// Drop the entry for `key`, if any.
    async fn remove(&self, key: &CacheKey);
    /// All stored entries, in unspecified order.
    async fn entries(&self) -> Vec<(CacheKey, CacheEntry)>;
}

/// In-memory backend; the only one production currently uses.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryBackend {
    /// An empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner.lock().await.get(key).cloned()
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) {
        self.inner.lock().await.insert(key, entry);
    }

    async fn remove(&self, key: &CacheKey) {
        self.inner.lock().await.remove(key);
    }

    async fn entries(&self) -> Vec<(CacheKey, CacheEntry)> {
        self.inner
            .lock()
            .await
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }
}

/// Cache-aside layer over an already rate-limited [`PayloadSource`].
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    source: Arc<dyn PayloadSource>,
    policy: CachePolicyConfig,
    clock: Arc<dyn Clock>,
    // Per-key refresh locks, pruned together with expired entries so
    // arbitrary price dates cannot accumulate state forever.
    flights: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl CacheStore {
    /// Build a store over `backend` refreshing from `source`.
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        source: Arc<dyn PayloadSource>,
        policy: CachePolicyConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            source,
            policy,
            clock,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Read the payload for `key` under the freshness policy.
    ///
    /// # Errors
    /// Returns `SolarBudgetError::Unavailable` when no payload within
    /// the stale window exists and the refresh failed. The underlying
    /// refresh failure is logged, not propagated.
    pub async fn read(
        &self,
        key: &CacheKey,
    ) -> Result<(serde_json::Value, CacheStatus), SolarBudgetError> {
        let now = self.clock.now_utc();
        if let Some(entry) = self.backend.get(key).await
            && self.is_fresh(&entry, now)
        {
            return Ok((entry.payload, CacheStatus::Fresh));
        }

        let flight = self.flight_lock(key).await;
        let _guard = flight.lock().await;

        // Another flight may have refreshed while this one waited.
        let now = self.clock.now_utc();
        self.evict_expired(now, key).await;
        let existing = self.backend.get(key).await;
        if let Some(entry) = &existing
            && self.is_fresh(entry, now)
        {
            return Ok((entry.payload.clone(), CacheStatus::Fresh));
        }

        match self.source.fetch(key).await {
            Ok(payload) => {
                // Never move fetched_at backwards under a lagging clock.
                let fetched_at = existing
                    .as_ref()
                    .map_or(now, |e| now.max(e.fetched_at));
                self.backend
                    .put(
                        *key,
                        CacheEntry {
                            payload: payload.clone(),
                            fetched_at,
                        },
                    )
                    .await;
                tracing::debug!(key = %key, "cache refreshed");
                Ok((payload, CacheStatus::Fresh))
            }
            Err(err) => {
                if let Some(entry) = existing {
                    if self.is_servable_stale(&entry, now) {
                        tracing::warn!(key = %key, error = %err, "refresh failed, serving stale");
                        return Ok((entry.payload, CacheStatus::Stale));
                    }
                    // Beyond max_stale and the refresh failed: nothing
                    // left worth keeping for this key.
                    self.backend.remove(key).await;
                }
                tracing::warn!(key = %key, error = %err, "refresh failed, no servable data");
                Err(SolarBudgetError::unavailable(key.to_string()))
            }
        }
    }

    /// Last successful fetch instant per stored key, sorted by key.
    pub async fn last_refresh(&self) -> Vec<KeyRefresh> {
        let mut out: Vec<KeyRefresh> = self
            .backend
            .entries()
            .await
            .into_iter()
            .map(|(key, entry)| KeyRefresh {
                key: key.to_string(),
                fetched_at: entry.fetched_at,
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        age_within(entry.fetched_at, now, self.policy.ttl)
    }

    fn is_servable_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        age_within(entry.fetched_at, now, self.policy.max_stale)
    }

    /// Drop every entry older than the stale window, along with its
    /// refresh lock. `active` is skipped: the caller holds its flight
    /// guard and is about to refresh or remove it itself.
    async fn evict_expired(&self, now: DateTime<Utc>, active: &CacheKey) {
        let expired: Vec<CacheKey> = self
            .backend
            .entries()
            .await
            .into_iter()
            .filter(|(key, entry)| key != active && !self.is_servable_stale(entry, now))
            .map(|(key, _)| key)
            .collect();
        if expired.is_empty() {
            return;
        }
        let mut flights = self.flights.lock().await;
        for key in expired {
            self.backend.remove(&key).await;
            flights.remove(&key);
            tracing::debug!(key = %key, "evicted expired cache entry");
        }
    }

    async fn flight_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        self.flights
            .lock()
            .await
            .entry(*key)
            .or_default()
            .clone()
    }
}

fn age_within(fetched_at: DateTime<Utc>, now: DateTime<Utc>, bound: std::time::Duration) -> bool {
    let age = now.signed_duration_since(fetched_at);
    // A future fetched_at (clock skew) counts as age zero.
    age <= chrono::Duration::from_std(bound).unwrap_or(chrono::Duration::MAX)
}
