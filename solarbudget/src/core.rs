//! The facade: wiring, reads, and health reporting.

use std::sync::Arc;

use chrono::NaiveDate;
use solarbudget_core::{
    CacheKey, Clock, DailyDataset, DailyTotal, FINE_STEP_SECS, ForecastPoint, ForecastSource,
    JoinedPoint, PricePoint, PriceSource, SolarBudgetError, SystemClock, cumulative, daily_totals,
    join, resample, split_at,
};
use solarbudget_middleware::{
    CacheBackend, CacheStore, DailyQuota, MemoryBackend, RateLimitedFetcher,
};
use solarbudget_types::{CacheStatus, HealthReport, SolarBudgetConfig};

use crate::router::SourceRouter;

/// Entry point for everything the service does: cached reads of the
/// derived daily dataset, health reporting, and the background refresh
/// loop (see [`SolarBudget::start_refresh`]).
///
/// Construct through [`SolarBudget::builder`].
pub struct SolarBudget {
    pub(crate) cfg: SolarBudgetConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) store: CacheStore,
    quota: Arc<DailyQuota>,
}

impl SolarBudget {
    /// A builder with default config, system clock, and in-memory cache.
    #[must_use]
    pub fn builder() -> SolarBudgetBuilder {
        SolarBudgetBuilder::new()
    }

    /// The current local calendar date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock
            .now_utc()
            .with_timezone(&self.cfg.timezone)
            .date_naive()
    }

    /// Assemble the derived dataset for one local calendar date.
    ///
    /// The forecast is read under the cache policy (refreshing when
    /// expired), resampled to the 15-minute grid, restricted to the
    /// intervals ending on `date` locally, and joined with that date's
    /// price series. A price series that cannot be served at all
    /// degrades to an empty join marked stale; only a missing forecast
    /// fails the read.
    ///
    /// # Errors
    /// Returns `SolarBudgetError::Unavailable` when no forecast within
    /// the stale window exists and refreshing failed.
    pub async fn dataset(&self, date: NaiveDate) -> Result<DailyDataset, SolarBudgetError> {
        let (payload, forecast_status) = self.store.read(&CacheKey::Forecast).await?;
        let forecast: Vec<ForecastPoint> = serde_json::from_value(payload)
            .map_err(|e| SolarBudgetError::upstream("cache", e.to_string()))?;

        let (prices, price_status) = match self.store.read(&CacheKey::Price(date)).await {
            Ok((payload, status)) => {
                let prices: Vec<PricePoint> = serde_json::from_value(payload)
                    .map_err(|e| SolarBudgetError::upstream("cache", e.to_string()))?;
                (prices, status)
            }
            Err(err) => {
                tracing::warn!(%date, error = %err, "price series unavailable, joining without prices");
                (Vec::new(), CacheStatus::Stale)
            }
        };

        let fine = resample(&forecast, FINE_STEP_SECS)?;
        let tz = self.cfg.timezone;
        let day_points: Vec<_> = fine
            .into_iter()
            .filter(|p| p.period_end.with_timezone(&tz).date_naive() == date)
            .collect();
        let joined = join(&day_points, &prices);
        if joined.mismatches > 0 {
            tracing::warn!(%date, mismatches = joined.mismatches, "forecast points without a matching price");
        }

        let points: Vec<JoinedPoint> = joined.points;
        let cumulative = cumulative(&points, FINE_STEP_SECS);
        let total = daily_totals(&points, FINE_STEP_SECS, tz)
            .into_iter()
            .find(|t| t.date == date)
            .unwrap_or(DailyTotal::zero(date));
        let split = split_at(&points, FINE_STEP_SECS, self.clock.now_utc());

        let status = if forecast_status == CacheStatus::Stale || price_status == CacheStatus::Stale
        {
            CacheStatus::Stale
        } else {
            CacheStatus::Fresh
        };

        Ok(DailyDataset {
            date,
            points,
            cumulative,
            total,
            split,
            join_mismatches: joined.mismatches,
            status,
        })
    }

    /// Refresh recency and rate-limit headroom for every tracked key.
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            last_refresh: self.store.last_refresh().await,
            rate_limits: self.quota.state(),
        }
    }
}

/// Assembles a [`SolarBudget`] from its sources and policies.
pub struct SolarBudgetBuilder {
    config: SolarBudgetConfig,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn CacheBackend>,
    forecast: Option<Arc<dyn ForecastSource>>,
    price: Option<Arc<dyn PriceSource>>,
}

impl SolarBudgetBuilder {
    fn new() -> Self {
        Self {
            config: SolarBudgetConfig::default(),
            clock: Arc::new(SystemClock),
            backend: Arc::new(MemoryBackend::new()),
            forecast: None,
            price: None,
        }
    }

    /// Use `source` for the production forecast. Required.
    #[must_use]
    pub fn with_forecast_source(mut self, source: Arc<dyn ForecastSource>) -> Self {
        self.forecast = Some(source);
        self
    }

    /// Use `source` for the price series. Required.
    #[must_use]
    pub fn with_price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.price = Some(source);
        self
    }

    /// Replace the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: SolarBudgetConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the system clock. Tests inject a manual clock here.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the in-memory cache backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Wire the middleware stack and produce the facade.
    ///
    /// # Errors
    /// Returns `SolarBudgetError::InvalidArg` when a required source is
    /// missing or the configuration is inconsistent.
    pub fn build(self) -> Result<SolarBudget, SolarBudgetError> {
        let forecast = self
            .forecast
            .ok_or_else(|| SolarBudgetError::invalid_arg("forecast source is required"))?;
        let price = self
            .price
            .ok_or_else(|| SolarBudgetError::invalid_arg("price source is required"))?;
        if self.config.price_publication_hour > 23 {
            return Err(SolarBudgetError::invalid_arg(format!(
                "price_publication_hour must be 0..=23, got {}",
                self.config.price_publication_hour
            )));
        }
        if self.config.cache.max_stale < self.config.cache.ttl {
            return Err(SolarBudgetError::invalid_arg(
                "cache.max_stale must be at least cache.ttl",
            ));
        }

        let router = Arc::new(SourceRouter::new(forecast, price));
        let quota = Arc::new(DailyQuota::new(
            self.config.rate_limit,
            self.config.timezone,
            self.clock.clone(),
        ));
        let fetcher = Arc::new(RateLimitedFetcher::new(
            router,
            quota.clone(),
            self.config.backoff,
        ));
        let store = CacheStore::new(self.backend, fetcher, self.config.cache, self.clock.clone());

        Ok(SolarBudget {
            cfg: self.config,
            clock: self.clock,
            store,
            quota,
        })
    }
}

impl Default for SolarBudgetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
