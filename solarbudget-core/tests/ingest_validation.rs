use chrono::DateTime;
use solarbudget_core::{
    ForecastPoint, PricePoint, SolarBudgetError, ingest::{validate_forecast, validate_prices},
};

fn fp(secs: i64, power: f64) -> ForecastPoint {
    ForecastPoint {
        period_end: DateTime::from_timestamp(secs, 0).unwrap(),
        power_p10: power,
        power_p50: power,
        power_p90: power,
    }
}

fn pp(secs: i64, price: f64) -> PricePoint {
    PricePoint {
        at: DateTime::from_timestamp(secs, 0).unwrap(),
        price,
    }
}

#[test]
fn well_formed_series_pass() {
    let forecast = [fp(0, 1.0), fp(1800, 2.0), fp(3600, 0.0)];
    assert!(validate_forecast("solcast", &forecast).is_ok());
    let prices = [pp(0, 450.0), pp(900, -10.0)];
    assert!(validate_prices("pse", &prices).is_ok());
    assert!(validate_forecast("solcast", &[]).is_ok());
    assert!(validate_prices("pse", &[]).is_ok());
}

#[test]
fn out_of_order_forecast_is_an_upstream_error() {
    let forecast = [fp(1800, 1.0), fp(0, 2.0)];
    let err = validate_forecast("solcast", &forecast).unwrap_err();
    match err {
        SolarBudgetError::Upstream { origin, .. } => assert_eq!(origin, "solcast"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_timestamps_are_rejected() {
    let forecast = [fp(900, 1.0), fp(900, 1.0)];
    assert!(validate_forecast("solcast", &forecast).is_err());
    let prices = [pp(900, 450.0), pp(900, 450.0)];
    assert!(validate_prices("pse", &prices).is_err());
}

#[test]
fn non_finite_values_are_rejected() {
    let forecast = [fp(0, 1.0), fp(1800, f64::NAN)];
    assert!(validate_forecast("solcast", &forecast).is_err());
    let prices = [pp(0, f64::INFINITY)];
    let err = validate_prices("pse", &prices).unwrap_err();
    assert!(err.is_retryable());
}
