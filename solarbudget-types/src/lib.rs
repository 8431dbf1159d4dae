//! solarbudget-types
//!
//! Serde-friendly configuration and status DTOs shared across the
//! solarbudget workspace. Pure data: no I/O, no async, no policy.
#![warn(missing_docs)]

/// Configuration surface for cache policy, rate limiting, retries, and refresh cadence.
pub mod config;
/// Point-in-time status snapshots exposed through the health accessor.
pub mod status;

pub use config::{
    BackoffConfig, CachePolicyConfig, RateLimitConfig, RefreshConfig, SolarBudgetConfig,
};
pub use status::{CacheStatus, HealthReport, KeyRefresh, RateLimitState};
