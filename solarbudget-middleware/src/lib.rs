//! solarbudget-middleware
//!
//! Layers wrapped around an upstream [`PayloadSource`], innermost
//! first:
//!
//! 1. [`RateLimitedFetcher`]: per-attempt daily quota accounting plus
//!    timeout and exponential-backoff retries.
//! 2. [`CacheStore`]: cache-aside reads with TTL freshness and a
//!    bounded stale-serving window, single-flight per key.
//!
//! [`PayloadSource`]: solarbudget_core::PayloadSource
#![warn(missing_docs)]

/// Cache store, policy evaluation, and backends.
pub mod cache;
/// Quota-accounted, retrying fetch wrapper.
pub mod fetch;
/// Per-key daily call budget.
pub mod quota;

pub use cache::{CacheBackend, CacheEntry, CacheStore, MemoryBackend};
pub use fetch::RateLimitedFetcher;
pub use quota::DailyQuota;
