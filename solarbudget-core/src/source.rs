//! Source traits implemented by upstream clients and mocks.
//!
//! Two levels exist. The typed traits ([`ForecastSource`],
//! [`PriceSource`]) are what concrete clients implement. The key-level
//! [`PayloadSource`] is the contract the cache and rate-limit middleware
//! wrap: one opaque JSON payload per [`CacheKey`], already validated at
//! ingestion.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{CacheKey, ForecastPoint, PricePoint, SolarBudgetError};

/// Provider of the 30-minute solar production forecast.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Stable source name used in error tagging and logs.
    fn name(&self) -> &'static str;

    /// Fetch the current forecast series, ordered ascending by
    /// `period_end`.
    async fn forecast(&self) -> Result<Vec<ForecastPoint>, SolarBudgetError>;
}

/// Provider of the 15-minute energy price series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Stable source name used in error tagging and logs.
    fn name(&self) -> &'static str;

    /// Fetch the price series for one business date, ordered ascending
    /// by `at`. An empty series is a normal "not yet published" result,
    /// not an error.
    async fn prices(&self, date: NaiveDate) -> Result<Vec<PricePoint>, SolarBudgetError>;
}

/// Key-addressed fetch contract consumed by the middleware stack.
///
/// Implementations must validate payloads before returning them: a
/// malformed or out-of-order upstream response is an
/// [`SolarBudgetError::Upstream`], never a stored payload.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Stable name for error tagging and logs.
    fn name(&self) -> &'static str;

    /// Fetch and validate the payload identified by `key`.
    async fn fetch(&self, key: &CacheKey) -> Result<serde_json::Value, SolarBudgetError>;
}
