//! Status snapshots surfaced by the read and health accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Freshness of a payload served from the cache.
///
/// `Unavailable` never appears on a served payload; it is signalled as an
/// error by the read path when neither fresh nor stale data exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Entry age was within the configured TTL, or it was just refetched.
    Fresh,
    /// Refresh failed; an expired entry within the stale window was served.
    Stale,
}

/// Last successful refresh instant for one cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRefresh {
    /// Cache key in its canonical string form (e.g. `price:2024-01-01`).
    pub key: String,
    /// When the key's payload was last fetched successfully.
    pub fetched_at: DateTime<Utc>,
}

/// Snapshot of one key's daily call budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    /// Cache key the counter applies to.
    pub key: String,
    /// Configured maximum attempted calls per calendar day.
    pub limit: u32,
    /// Calls already attempted today.
    pub used: u32,
    /// Next local-midnight boundary, as a UTC instant.
    pub resets_at: DateTime<Utc>,
}

/// Aggregate health view: refresh recency plus rate-limit headroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Last successful refresh per cached key.
    pub last_refresh: Vec<KeyRefresh>,
    /// Current daily-counter state per key.
    pub rate_limits: Vec<RateLimitState>,
}
