//! Dispatch from cache keys to the typed upstream sources.

use std::sync::Arc;

use async_trait::async_trait;
use solarbudget_core::{
    CacheKey, ForecastSource, PayloadSource, PriceSource, SolarBudgetError, ingest,
};

/// Adapts the two typed sources to the key-addressed [`PayloadSource`]
/// contract the middleware stack wraps.
///
/// Payloads are validated here, before they can reach the cache: a
/// malformed upstream response fails the fetch instead of poisoning
/// stored state.
pub(crate) struct SourceRouter {
    forecast: Arc<dyn ForecastSource>,
    price: Arc<dyn PriceSource>,
}

impl SourceRouter {
    pub(crate) fn new(forecast: Arc<dyn ForecastSource>, price: Arc<dyn PriceSource>) -> Self {
        Self { forecast, price }
    }
}

#[async_trait]
impl PayloadSource for SourceRouter {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn fetch(&self, key: &CacheKey) -> Result<serde_json::Value, SolarBudgetError> {
        match key {
            CacheKey::Forecast => {
                let points = self.forecast.forecast().await?;
                ingest::validate_forecast(self.forecast.name(), &points)?;
                serde_json::to_value(points)
                    .map_err(|e| SolarBudgetError::upstream(self.forecast.name(), e.to_string()))
            }
            CacheKey::Price(date) => {
                let points = self.price.prices(*date).await?;
                ingest::validate_prices(self.price.name(), &points)?;
                serde_json::to_value(points)
                    .map_err(|e| SolarBudgetError::upstream(self.price.name(), e.to_string()))
            }
        }
    }
}
