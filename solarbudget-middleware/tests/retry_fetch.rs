use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use solarbudget_core::{CacheKey, PayloadSource, SolarBudgetError};
use solarbudget_middleware::{DailyQuota, RateLimitedFetcher};
use solarbudget_mock::{ManualClock, MockPayloadSource};
use solarbudget_types::{BackoffConfig, RateLimitConfig};

fn fast_backoff(max_attempts: u32) -> BackoffConfig {
    BackoffConfig {
        min_backoff_ms: 1,
        max_backoff_ms: 4,
        factor: 2,
        jitter_percent: 0,
        max_attempts,
        attempt_timeout: Duration::from_secs(5),
    }
}

fn quota(limit: u32) -> Arc<DailyQuota> {
    let clock = Arc::new(ManualClock::new(
        "2024-06-15T12:00:00Z".parse().unwrap(),
    ));
    Arc::new(DailyQuota::new(
        RateLimitConfig { daily_limit: limit },
        chrono_tz::UTC,
        clock,
    ))
}

#[tokio::test]
async fn success_passes_the_payload_through_on_the_first_attempt() {
    let source = Arc::new(MockPayloadSource::new("mock", json!({"v": 7})));
    let fetcher = RateLimitedFetcher::new(source.clone(), quota(10), fast_backoff(3));

    let payload = fetcher.fetch(&CacheKey::Forecast).await.unwrap();
    assert_eq!(payload, json!({"v": 7}));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn retryable_failures_are_attempted_up_to_the_limit() {
    let source = Arc::new(MockPayloadSource::new("mock", json!({})));
    source.set_failing(true);
    let fetcher = RateLimitedFetcher::new(source.clone(), quota(10), fast_backoff(3));

    let err = fetcher.fetch(&CacheKey::Forecast).await.unwrap_err();
    assert!(matches!(err, SolarBudgetError::Upstream { .. }));
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn every_attempt_consumes_daily_budget() {
    let source = Arc::new(MockPayloadSource::new("mock", json!({})));
    source.set_failing(true);
    // Two units of budget, three allowed attempts: the third attempt
    // must be refused by the quota, not sent upstream.
    let fetcher = RateLimitedFetcher::new(source.clone(), quota(2), fast_backoff(3));

    let err = fetcher.fetch(&CacheKey::Forecast).await.unwrap_err();
    assert!(matches!(err, SolarBudgetError::RateLimitExceeded { .. }));
    assert_eq!(source.calls(), 2);
}

struct NeverResolves;

#[async_trait]
impl PayloadSource for NeverResolves {
    fn name(&self) -> &'static str {
        "never"
    }

    async fn fetch(&self, _key: &CacheKey) -> Result<serde_json::Value, SolarBudgetError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(json!({}))
    }
}

#[tokio::test]
async fn slow_attempts_are_cut_off_by_the_per_attempt_timeout() {
    let backoff = BackoffConfig {
        attempt_timeout: Duration::from_millis(20),
        ..fast_backoff(1)
    };
    let fetcher = RateLimitedFetcher::new(Arc::new(NeverResolves), quota(10), backoff);

    let err = fetcher.fetch(&CacheKey::Forecast).await.unwrap_err();
    assert!(matches!(err, SolarBudgetError::Timeout { .. }));
}
