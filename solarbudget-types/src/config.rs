//! Configuration types shared between the facade, middleware, and sources.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache freshness policy for a single upstream key.
///
/// An entry younger than `ttl` is served as-is. Between `ttl` and
/// `max_stale` a refresh is attempted and the old payload is served only
/// when that refresh fails. Beyond `max_stale` the old payload is never
/// served.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CachePolicyConfig {
    /// Age below which a cached payload is considered fresh.
    pub ttl: Duration,
    /// Maximum age at which an expired payload may still be served as a
    /// fallback when a refresh fails.
    pub max_stale: Duration,
}

impl Default for CachePolicyConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_stale: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Per-key daily call ceiling for upstream requests.
///
/// The counter resets at local midnight in the configured workspace
/// timezone, independent of cache TTLs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum attempted upstream calls per key per calendar day.
    pub daily_limit: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { daily_limit: 10 }
    }
}

/// Exponential backoff configuration for retried upstream fetches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
    /// Total attempts per fetch, first try included.
    pub max_attempts: u32,
    /// Hard bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 500,
            max_backoff_ms: 30_000,
            factor: 2,
            jitter_percent: 20,
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Cadence of the background cache-warming loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Base sleep between refresh ticks.
    pub interval: Duration,
    /// Random jitter percentage [0, 100] added to each sleep.
    pub jitter_percent: u8,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
            jitter_percent: 10,
        }
    }
}

/// Global configuration for the solarbudget service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarBudgetConfig {
    /// Cache freshness policy applied to every key.
    pub cache: CachePolicyConfig,
    /// Daily upstream call ceiling.
    pub rate_limit: RateLimitConfig,
    /// Retry/backoff/timeout policy for upstream fetches.
    pub backoff: BackoffConfig,
    /// Background refresh cadence.
    pub refresh: RefreshConfig,
    /// Local timezone used for calendar-day boundaries: quota resets,
    /// daily totals, and the price publication cutoff.
    pub timezone: chrono_tz::Tz,
    /// Local hour (0-23) from which the next day's price series is
    /// published upstream.
    pub price_publication_hour: u32,
}

impl Default for SolarBudgetConfig {
    fn default() -> Self {
        Self {
            cache: CachePolicyConfig::default(),
            rate_limit: RateLimitConfig::default(),
            backoff: BackoffConfig::default(),
            refresh: RefreshConfig::default(),
            timezone: chrono_tz::Europe::Warsaw,
            price_publication_hour: 16,
        }
    }
}
