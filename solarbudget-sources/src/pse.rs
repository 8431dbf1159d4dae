//! PSE day-ahead energy price client.
//!
//! `GET {base}?$filter=doba eq 'YYYY-MM-DD'` against the `rce-pln`
//! report. Rows label each 15-minute interval with a local-time range
//! like `"23:45 - 24:00"`; the range *end* becomes the point's UTC
//! instant, with `24:00` wrapping onto midnight of the next day.
//!
//! A date the upstream has not published yet answers with an empty
//! `value` array, which maps to an empty series here, not an error.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use solarbudget_core::{PricePoint, PriceSource, SolarBudgetError};

const DEFAULT_BASE_URL: &str = "https://api.raporty.pse.pl/api/rce-pln";

#[derive(Debug, Deserialize)]
struct PseResponse {
    #[serde(default)]
    value: Vec<PseRow>,
}

#[derive(Debug, Deserialize)]
struct PseRow {
    doba: String,
    udtczas_oreb: String,
    rce_pln: f64,
}

/// [`PriceSource`] backed by the PSE `rce-pln` report.
pub struct PseSource {
    client: reqwest::Client,
    base_url: String,
    tz: Tz,
}

impl PseSource {
    /// Build a client whose interval labels are interpreted in `tz`.
    ///
    /// # Errors
    /// Returns an upstream error when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(tz: Tz) -> Result<Self, SolarBudgetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SolarBudgetError::upstream("pse", e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            tz,
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
impl PriceSource for PseSource {
    fn name(&self) -> &'static str {
        "pse"
    }

    async fn prices(&self, date: NaiveDate) -> Result<Vec<PricePoint>, SolarBudgetError> {
        let filter = format!("doba eq '{}'", date.format("%Y-%m-%d"));
        tracing::debug!(%date, "fetching pse prices");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("$filter", filter.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SolarBudgetError::upstream("pse", e.to_string()))?
            .error_for_status()
            .map_err(|e| SolarBudgetError::upstream("pse", e.to_string()))?;
        let body: PseResponse = response
            .json()
            .await
            .map_err(|e| SolarBudgetError::upstream("pse", e.to_string()))?;
        body.value
            .into_iter()
            .map(|row| {
                let at = interval_end_utc(&row.doba, &row.udtczas_oreb, self.tz)?;
                Ok(PricePoint {
                    at,
                    price: row.rce_pln,
                })
            })
            .collect()
    }
}

fn interval_end_utc(doba: &str, label: &str, tz: Tz) -> Result<DateTime<Utc>, SolarBudgetError> {
    let date: NaiveDate = doba
        .parse()
        .map_err(|e| SolarBudgetError::upstream("pse", format!("bad business date {doba:?}: {e}")))?;
    let end = label
        .split(" - ")
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| {
            SolarBudgetError::upstream("pse", format!("bad interval label {label:?}"))
        })?;
    let (date, time) = if end == "24:00" {
        let next = date.succ_opt().ok_or_else(|| {
            SolarBudgetError::upstream("pse", format!("business date {doba:?} out of range"))
        })?;
        (next, NaiveTime::MIN)
    } else {
        let time = NaiveTime::parse_from_str(end, "%H:%M").map_err(|e| {
            SolarBudgetError::upstream("pse", format!("bad interval label {label:?}: {e}"))
        })?;
        (date, time)
    };
    // An ambiguous local time (fall-back DST hour) maps to its earlier
    // UTC instant.
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            SolarBudgetError::upstream(
                "pse",
                format!("nonexistent local time {date} {end} in {tz}"),
            )
        })
}
