//! Domain data structures shared across the workspace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use solarbudget_types::CacheStatus;

use crate::SolarBudgetError;

/// Upstream forecast cadence.
pub const COARSE_STEP_SECS: i64 = 30 * 60;
/// Target cadence of the derived dataset, matching the price series.
pub const FINE_STEP_SECS: i64 = 15 * 60;

/// Instantaneous forecast power (kW) at the *end* of a 30-minute interval,
/// carrying the pessimistic/median/optimistic percentile bands.
///
/// Sequences are strictly ascending by `period_end` with unique
/// timestamps; that invariant is enforced at ingestion, never by
/// re-sorting downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// End of the forecast interval.
    pub period_end: DateTime<Utc>,
    /// Pessimistic (10th percentile) power in kW.
    pub power_p10: f64,
    /// Median power in kW.
    pub power_p50: f64,
    /// Optimistic (90th percentile) power in kW.
    pub power_p90: f64,
}

/// A forecast point re-expressed on the 15-minute grid. Derived, never
/// persisted; shape is identical to the coarse point.
pub type ResampledPoint = ForecastPoint;

/// Energy price valid for the 15-minute interval *ending* at `at`.
/// Quoted per MWh, as published by the upstream price source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// End of the pricing interval.
    pub at: DateTime<Utc>,
    /// Price per MWh in the upstream currency.
    pub price: f64,
}

/// One resampled forecast point matched against the price series.
/// `price` is `None` when no price point shares the normalized instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinedPoint {
    /// End of the 15-minute interval.
    pub at: DateTime<Utc>,
    /// Pessimistic power in kW.
    pub power_p10: f64,
    /// Median power in kW.
    pub power_p50: f64,
    /// Optimistic power in kW.
    pub power_p90: f64,
    /// Matching price per MWh, if any.
    pub price: Option<f64>,
}

/// Running cumulative energy and value per band up to and including the
/// interval ending at `at`. Consumed by cumulative charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// End of the interval this running total includes.
    pub at: DateTime<Utc>,
    /// Cumulative pessimistic energy in kWh.
    pub energy_p10: f64,
    /// Cumulative median energy in kWh.
    pub energy_p50: f64,
    /// Cumulative optimistic energy in kWh.
    pub energy_p90: f64,
    /// Cumulative pessimistic value in currency units.
    pub value_p10: f64,
    /// Cumulative median value in currency units.
    pub value_p50: f64,
    /// Cumulative optimistic value in currency units.
    pub value_p90: f64,
}

/// Total energy and monetary value for one local calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Local calendar date the totals cover.
    pub date: NaiveDate,
    /// Pessimistic energy in kWh.
    pub energy_p10: f64,
    /// Median energy in kWh.
    pub energy_p50: f64,
    /// Optimistic energy in kWh.
    pub energy_p90: f64,
    /// Pessimistic value in currency units.
    pub value_p10: f64,
    /// Median value in currency units.
    pub value_p50: f64,
    /// Optimistic value in currency units.
    pub value_p90: f64,
}

impl DailyTotal {
    /// An all-zero total for a date with no covered intervals.
    #[must_use]
    pub const fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            energy_p10: 0.0,
            energy_p50: 0.0,
            energy_p90: 0.0,
            value_p10: 0.0,
            value_p50: 0.0,
            value_p90: 0.0,
        }
    }
}

/// Per-band energy split of the current date into the part already
/// produced and the part still ahead of the caller-supplied instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergySplit {
    /// Energy (kWh) attributed up to the split index, per band.
    pub produced_p10: f64,
    /// Median produced energy in kWh.
    pub produced_p50: f64,
    /// Optimistic produced energy in kWh.
    pub produced_p90: f64,
    /// Pessimistic remaining energy in kWh.
    pub remaining_p10: f64,
    /// Median remaining energy in kWh.
    pub remaining_p50: f64,
    /// Optimistic remaining energy in kWh.
    pub remaining_p90: f64,
}

/// The derived dataset for one local calendar date, as served to the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDataset {
    /// Local calendar date covered.
    pub date: NaiveDate,
    /// Joined 15-minute points falling on `date`.
    pub points: Vec<JoinedPoint>,
    /// Running per-band totals across `points`.
    pub cumulative: Vec<CumulativePoint>,
    /// Per-date totals.
    pub total: DailyTotal,
    /// Produced/remaining split at the read instant.
    pub split: EnergySplit,
    /// Number of resampled points that found no matching price.
    pub join_mismatches: usize,
    /// Freshness of the underlying cached data.
    pub status: CacheStatus,
}

/// Identity of a distinct upstream query in the cache and quota layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// The rolling forecast series (site-wide, not date-scoped).
    Forecast,
    /// The price series for one business date.
    Price(NaiveDate),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forecast => f.write_str("forecast"),
            Self::Price(date) => write!(f, "price:{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for CacheKey {
    type Err = SolarBudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "forecast" {
            return Ok(Self::Forecast);
        }
        if let Some(date) = s.strip_prefix("price:") {
            let date = date
                .parse::<NaiveDate>()
                .map_err(|e| SolarBudgetError::invalid_arg(format!("bad cache key {s:?}: {e}")))?;
            return Ok(Self::Price(date));
        }
        Err(SolarBudgetError::invalid_arg(format!(
            "unknown cache key {s:?}"
        )))
    }
}
