use chrono::{DateTime, Utc};
use thiserror::Error;

/// Unified error type for the solarbudget workspace.
///
/// Covers rate limiting, per-attempt timeouts, upstream failures
/// (network, HTTP, malformed or out-of-order payloads), the terminal
/// "no usable cached data" condition, and argument validation.
///
/// A join mismatch is deliberately *not* an error: it is recorded as a
/// `None` price and counted on the joined output.
#[derive(Debug, Error)]
pub enum SolarBudgetError {
    /// The per-key daily call ceiling has been reached; no network call
    /// was attempted.
    #[error("rate limit exceeded for {key}: {used}/{limit} calls today, resets at {resets_at}")]
    RateLimitExceeded {
        /// Cache key whose budget is exhausted.
        key: String,
        /// Configured daily ceiling.
        limit: u32,
        /// Calls already attempted today.
        used: u32,
        /// Next local-midnight boundary, as a UTC instant.
        resets_at: DateTime<Utc>,
    },

    /// A single upstream attempt exceeded the configured duration.
    #[error("upstream timed out fetching {key} after {timeout_ms} ms")]
    Timeout {
        /// Cache key being fetched.
        key: String,
        /// Configured per-attempt bound in milliseconds.
        timeout_ms: u64,
    },

    /// An upstream source failed: network or HTTP error, or a payload
    /// that was malformed, out of order, or otherwise unusable.
    // The field is `origin`, not `source`: thiserror reserves `source`
    // for the error cause, and a plain String cannot be one.
    #[error("{origin} failed: {msg}")]
    Upstream {
        /// Name of the failing source (e.g. "solcast", "pse").
        origin: String,
        /// Human-readable failure message.
        msg: String,
    },

    /// No cached data exists within the stale window and refresh failed.
    /// This is the only condition a caller must treat as a hard failure.
    #[error("no usable data for {key}")]
    Unavailable {
        /// Cache key with no servable payload.
        key: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl SolarBudgetError {
    /// Helper: build an `Upstream` error tagged with the source name.
    pub fn upstream(origin: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            origin: origin.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Unavailable` error for a cache key.
    pub fn unavailable(key: impl Into<String>) -> Self {
        Self::Unavailable { key: key.into() }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// True when retrying the same call later could succeed without any
    /// state change on our side (network trouble or a slow upstream).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Timeout { .. })
    }
}
