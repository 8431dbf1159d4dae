//! Solcast rooftop forecast client.
//!
//! `GET {base}/rooftop_sites/{site_id}/forecasts?format=json` with a
//! bearer token, answering 30-minute `period_end` samples carrying the
//! median estimate and its 10th/90th percentile bands.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;
use solarbudget_core::{ForecastPoint, ForecastSource, SolarBudgetError};

const DEFAULT_BASE_URL: &str = "https://api.solcast.com.au";

/// Bearer credential for the Solcast API.
///
/// The token is deliberately unreadable through `Debug` so it can never
/// leak into logs or error messages.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(redacted)")
    }
}

impl From<&str> for ApiKey {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ApiKey {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecasts: Vec<WireForecast>,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    period_end: DateTime<Utc>,
    pv_estimate: f64,
    pv_estimate10: Option<f64>,
    pv_estimate90: Option<f64>,
}

/// [`ForecastSource`] backed by the Solcast rooftop API.
pub struct SolcastSource {
    client: reqwest::Client,
    base_url: String,
    site_id: String,
    api_key: ApiKey,
}

impl SolcastSource {
    /// Build a client for one rooftop site.
    ///
    /// # Errors
    /// Returns an upstream error when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(site_id: impl Into<String>, api_key: ApiKey) -> Result<Self, SolarBudgetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SolarBudgetError::upstream("solcast", e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            site_id: site_id.into(),
            api_key,
        })
    }

    /// Point the client at a different endpoint. Used by tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ForecastSource for SolcastSource {
    fn name(&self) -> &'static str {
        "solcast"
    }

    async fn forecast(&self) -> Result<Vec<ForecastPoint>, SolarBudgetError> {
        let url = format!("{}/rooftop_sites/{}/forecasts", self.base_url, self.site_id);
        tracing::debug!(site_id = %self.site_id, "fetching solcast forecast");
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .bearer_auth(self.api_key.reveal())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SolarBudgetError::upstream("solcast", e.to_string()))?
            .error_for_status()
            .map_err(|e| SolarBudgetError::upstream("solcast", e.to_string()))?;
        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| SolarBudgetError::upstream("solcast", e.to_string()))?;
        Ok(body
            .forecasts
            .into_iter()
            .map(|f| ForecastPoint {
                // Sub-second precision is dropped so instants compare
                // exactly against the price grid.
                period_end: f.period_end.with_nanosecond(0).unwrap_or(f.period_end),
                power_p10: f.pv_estimate10.unwrap_or(f.pv_estimate),
                power_p50: f.pv_estimate,
                power_p90: f.pv_estimate90.unwrap_or(f.pv_estimate),
            })
            .collect())
    }
}
