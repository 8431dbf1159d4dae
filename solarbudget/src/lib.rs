//! solarbudget
//!
//! Facade crate tying the workspace together: typed upstream sources
//! behind a rate-limited, retried, cached fetch pipeline, a derived
//! per-day dataset (resampled forecast joined with prices, energy and
//! value aggregates), a health snapshot, and a background refresh loop.
//!
//! ```no_run
//! use std::sync::Arc;
//! use solarbudget::SolarBudget;
//! use solarbudget_sources::{ApiKey, PseSource, SolcastSource};
//!
//! # async fn run() -> Result<(), solarbudget::SolarBudgetError> {
//! let cfg = solarbudget::SolarBudgetConfig::default();
//! let budget = Arc::new(
//!     SolarBudget::builder()
//!         .with_forecast_source(Arc::new(SolcastSource::new(
//!             "site-id",
//!             ApiKey::new("token"),
//!         )?))
//!         .with_price_source(Arc::new(PseSource::new(cfg.timezone)?))
//!         .with_config(cfg)
//!         .build()?,
//! );
//! let _refresh = budget.start_refresh();
//! let dataset = budget.dataset(budget.today()).await?;
//! println!("expected today: {:.1} kWh", dataset.total.energy_p50);
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod router;
mod scheduler;

pub use core::{SolarBudget, SolarBudgetBuilder};

pub use solarbudget_core::{
    CacheKey, Clock, CumulativePoint, DailyDataset, DailyTotal, EnergySplit, ForecastPoint,
    ForecastSource, JoinedPoint, PricePoint, PriceSource, SolarBudgetError, SystemClock,
    TaskHandle,
};
pub use solarbudget_middleware::{CacheBackend, MemoryBackend};
pub use solarbudget_types::{
    BackoffConfig, CachePolicyConfig, CacheStatus, HealthReport, KeyRefresh, RateLimitConfig,
    RateLimitState, RefreshConfig, SolarBudgetConfig,
};
