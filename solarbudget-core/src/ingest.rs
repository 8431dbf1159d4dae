//! Ingestion-boundary validation.
//!
//! Upstream payloads are checked here before they may enter the cache:
//! strictly ascending unique timestamps and finite values. A violation
//! is an upstream failure, and the core never re-sorts or de-duplicates
//! on the caller's behalf.

use crate::{ForecastPoint, PricePoint, SolarBudgetError};

/// Validate a forecast series fetched from `source`.
///
/// # Errors
/// Returns `Err(SolarBudgetError::Upstream)` when timestamps are not
/// strictly ascending, are duplicated, or any power value is non-finite.
pub fn validate_forecast(
    source: &str,
    points: &[ForecastPoint],
) -> Result<(), SolarBudgetError> {
    for pair in points.windows(2) {
        if pair[1].period_end <= pair[0].period_end {
            return Err(SolarBudgetError::upstream(
                source,
                format!(
                    "forecast timestamps not strictly ascending at {}",
                    pair[1].period_end
                ),
            ));
        }
    }
    for p in points {
        if !(p.power_p10.is_finite() && p.power_p50.is_finite() && p.power_p90.is_finite()) {
            return Err(SolarBudgetError::upstream(
                source,
                format!("non-finite forecast power at {}", p.period_end),
            ));
        }
    }
    Ok(())
}

/// Validate a price series fetched from `source`.
///
/// # Errors
/// Returns `Err(SolarBudgetError::Upstream)` when timestamps are not
/// strictly ascending, are duplicated, or any price is non-finite.
pub fn validate_prices(source: &str, points: &[PricePoint]) -> Result<(), SolarBudgetError> {
    for pair in points.windows(2) {
        if pair[1].at <= pair[0].at {
            return Err(SolarBudgetError::upstream(
                source,
                format!("price timestamps not strictly ascending at {}", pair[1].at),
            ));
        }
    }
    for p in points {
        if !p.price.is_finite() {
            return Err(SolarBudgetError::upstream(
                source,
                format!("non-finite price at {}", p.at),
            ));
        }
    }
    Ok(())
}
