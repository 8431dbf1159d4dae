use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use solarbudget::{
    BackoffConfig, CacheStatus, ForecastPoint, PricePoint, SolarBudget, SolarBudgetConfig,
    SolarBudgetError,
};
use solarbudget_mock::{ManualClock, MockForecastSource, MockPriceSource};

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn test_config() -> SolarBudgetConfig {
    SolarBudgetConfig {
        backoff: BackoffConfig {
            min_backoff_ms: 1,
            max_backoff_ms: 2,
            factor: 2,
            jitter_percent: 0,
            max_attempts: 1,
            attempt_timeout: Duration::from_secs(5),
        },
        timezone: chrono_tz::UTC,
        ..SolarBudgetConfig::default()
    }
}

fn two_point_forecast() -> Vec<ForecastPoint> {
    vec![
        ForecastPoint {
            period_end: ts("2024-06-15T10:00:00Z"),
            power_p10: 1.0,
            power_p50: 2.0,
            power_p90: 3.0,
        },
        ForecastPoint {
            period_end: ts("2024-06-15T10:30:00Z"),
            power_p10: 3.0,
            power_p50: 4.0,
            power_p90: 5.0,
        },
    ]
}

fn flat_prices_for_window() -> Vec<PricePoint> {
    ["2024-06-15T10:00:00Z", "2024-06-15T10:15:00Z", "2024-06-15T10:30:00Z"]
        .iter()
        .map(|s| PricePoint {
            at: ts(s),
            price: 1000.0,
        })
        .collect()
}

struct Fixture {
    budget: Arc<SolarBudget>,
    forecast: Arc<MockForecastSource>,
    price: Arc<MockPriceSource>,
    clock: Arc<ManualClock>,
}

fn fixture(now: &str) -> Fixture {
    let forecast = Arc::new(MockForecastSource::with_points(two_point_forecast()));
    let price = Arc::new(MockPriceSource::new());
    price.publish(date(), flat_prices_for_window());
    let clock = Arc::new(ManualClock::new(ts(now)));
    let budget = Arc::new(
        SolarBudget::builder()
            .with_forecast_source(forecast.clone())
            .with_price_source(price.clone())
            .with_config(test_config())
            .with_clock(clock.clone())
            .build()
            .unwrap(),
    );
    Fixture {
        budget,
        forecast,
        price,
        clock,
    }
}

#[tokio::test]
async fn dataset_resamples_joins_and_aggregates() {
    let fx = fixture("2024-06-15T10:15:00Z");
    let ds = fx.budget.dataset(date()).await.unwrap();

    assert_eq!(ds.date, date());
    assert_eq!(ds.status, CacheStatus::Fresh);
    assert_eq!(ds.join_mismatches, 0);
    assert_eq!(ds.points.len(), 3);
    assert_eq!(
        ds.points.iter().map(|p| p.power_p50).collect::<Vec<_>>(),
        vec![2.0, 3.0, 4.0]
    );
    assert!(ds.points.iter().all(|p| p.price == Some(1000.0)));

    assert!((ds.total.energy_p90 - 3.0).abs() < 1e-12);
    assert!((ds.total.value_p90 - 3.0).abs() < 1e-12);
    let last = ds.cumulative.last().unwrap();
    assert!((last.energy_p90 - 3.0).abs() < 1e-12);

    // The read instant sits exactly on the 10:15 point: the first two
    // intervals count as produced, the last as remaining.
    assert!((ds.split.produced_p90 - 1.75).abs() < 1e-12);
    assert!((ds.split.remaining_p90 - 1.25).abs() < 1e-12);
}

#[tokio::test]
async fn unpublished_prices_join_as_counted_mismatches() {
    let fx = fixture("2024-06-15T10:15:00Z");
    fx.price.publish(date(), Vec::new());

    let ds = fx.budget.dataset(date()).await.unwrap();
    assert_eq!(ds.join_mismatches, 3);
    assert!(ds.points.iter().all(|p| p.price.is_none()));
    // Energy is untouched; only value collapses to zero.
    assert!((ds.total.energy_p50 - 2.25).abs() < 1e-12);
    assert_eq!(ds.total.value_p50, 0.0);
    assert_eq!(ds.status, CacheStatus::Fresh);
}

#[tokio::test]
async fn failing_price_source_degrades_to_a_stale_priceless_dataset() {
    let fx = fixture("2024-06-15T10:15:00Z");
    fx.price.set_failing(true);

    let ds = fx.budget.dataset(date()).await.unwrap();
    assert_eq!(ds.status, CacheStatus::Stale);
    assert_eq!(ds.join_mismatches, 3);
    assert!((ds.total.energy_p50 - 2.25).abs() < 1e-12);
}

#[tokio::test]
async fn failing_forecast_with_an_empty_cache_is_unavailable() {
    let fx = fixture("2024-06-15T10:15:00Z");
    fx.forecast.set_failing(true);

    let err = fx.budget.dataset(date()).await.unwrap_err();
    assert!(matches!(err, SolarBudgetError::Unavailable { .. }));
}

#[tokio::test]
async fn expired_forecast_with_failing_refresh_is_served_stale() {
    let fx = fixture("2024-06-15T10:15:00Z");
    fx.budget.dataset(date()).await.unwrap();

    fx.forecast.set_failing(true);
    fx.clock.advance(Duration::from_secs(31 * 60));

    let ds = fx.budget.dataset(date()).await.unwrap();
    assert_eq!(ds.status, CacheStatus::Stale);
    assert_eq!(ds.points.len(), 3);
}

#[tokio::test]
async fn fresh_reads_are_served_from_cache_without_upstream_calls() {
    let fx = fixture("2024-06-15T10:15:00Z");
    fx.budget.dataset(date()).await.unwrap();
    fx.budget.dataset(date()).await.unwrap();

    assert_eq!(fx.forecast.calls(), 1);
    assert_eq!(fx.price.calls(), 1);
}

#[tokio::test]
async fn points_outside_the_requested_local_date_are_dropped() {
    let fx = fixture("2024-06-15T10:15:00Z");
    let other = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();

    let ds = fx.budget.dataset(other).await.unwrap();
    assert!(ds.points.is_empty());
    assert_eq!(ds.total.energy_p50, 0.0);
    assert_eq!(ds.total.date, other);
}

#[test]
fn builder_requires_both_sources() {
    assert!(matches!(
        SolarBudget::builder().build(),
        Err(SolarBudgetError::InvalidArg(_))
    ));
}

#[tokio::test]
async fn today_follows_the_configured_timezone() {
    let forecast = Arc::new(MockForecastSource::with_points(Vec::new()));
    let price = Arc::new(MockPriceSource::new());
    let clock = Arc::new(ManualClock::new(ts("2024-06-15T23:30:00Z")));
    let budget = SolarBudget::builder()
        .with_forecast_source(forecast)
        .with_price_source(price)
        .with_config(SolarBudgetConfig {
            timezone: chrono_tz::Europe::Warsaw,
            ..test_config()
        })
        .with_clock(clock)
        .build()
        .unwrap();
    // 23:30 UTC is already past midnight in Warsaw (CEST).
    assert_eq!(budget.today(), NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
}
