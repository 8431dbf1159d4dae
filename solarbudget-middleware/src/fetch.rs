//! Quota-aware, retrying fetch wrapper around a [`PayloadSource`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use solarbudget_core::{CacheKey, PayloadSource, SolarBudgetError};
use solarbudget_types::BackoffConfig;

use crate::quota::DailyQuota;

/// Wraps an upstream source with the daily quota and an exponential
/// backoff retry loop.
///
/// Every *attempt* consumes quota, including retries, so a flapping
/// upstream cannot burn through the daily budget unnoticed. Quota
/// refusal and non-retryable errors abort the loop immediately.
pub struct RateLimitedFetcher {
    inner: Arc<dyn PayloadSource>,
    quota: Arc<DailyQuota>,
    backoff: BackoffConfig,
}

impl RateLimitedFetcher {
    /// Wrap `inner` with `quota` accounting and the `backoff` policy.
    pub fn new(inner: Arc<dyn PayloadSource>, quota: Arc<DailyQuota>, backoff: BackoffConfig) -> Self {
        Self {
            inner,
            quota,
            backoff,
        }
    }
}

#[async_trait]
impl PayloadSource for RateLimitedFetcher {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, key: &CacheKey) -> Result<serde_json::Value, SolarBudgetError> {
        let max_attempts = self.backoff.max_attempts.max(1);
        let timeout_ms = u64::try_from(self.backoff.attempt_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut delay_ms = self.backoff.min_backoff_ms;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.quota.try_consume(key)?;
            let outcome =
                tokio::time::timeout(self.backoff.attempt_timeout, self.inner.fetch(key)).await;
            let err = match outcome {
                Ok(Ok(payload)) => return Ok(payload),
                Ok(Err(e)) => e,
                Err(_) => SolarBudgetError::Timeout {
                    key: key.to_string(),
                    timeout_ms,
                },
            };
            if !err.is_retryable() || attempt >= max_attempts {
                return Err(err);
            }
            tracing::warn!(
                source = self.inner.name(),
                key = %key,
                attempt,
                error = %err,
                "upstream fetch failed, backing off"
            );
            tokio::time::sleep(jittered(delay_ms, self.backoff.jitter_percent)).await;
            delay_ms = delay_ms
                .saturating_mul(u64::from(self.backoff.factor.max(1)))
                .min(self.backoff.max_backoff_ms);
        }
    }
}

fn jittered(base_ms: u64, jitter_percent: u8) -> Duration {
    let span = base_ms * u64::from(jitter_percent) / 100;
    let extra = if span == 0 {
        0
    } else {
        rand::rng().random_range(0..=span)
    };
    Duration::from_millis(base_ms + extra)
}
