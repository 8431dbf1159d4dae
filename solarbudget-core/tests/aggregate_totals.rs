use chrono::{DateTime, NaiveDate, Utc};
use solarbudget_core::{
    FINE_STEP_SECS, ForecastPoint, JoinedPoint, PricePoint, cumulative, daily_totals, join,
    resample,
};

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[test]
fn constant_power_over_one_day_yields_power_times_24() {
    let p = 3.2;
    // One local day of 15-minute intervals, ends at 00:15 .. 24:00.
    let points: Vec<JoinedPoint> = (1..=96)
        .map(|i| JoinedPoint {
            at: ts(i * FINE_STEP_SECS),
            power_p10: p,
            power_p50: p,
            power_p90: p,
            price: None,
        })
        .collect();
    let totals = daily_totals(&points, FINE_STEP_SECS, chrono_tz::UTC);
    // The 24:00 interval end rolls into the next calendar date.
    let day_energy: f64 = totals.iter().map(|t| t.energy_p50).sum();
    assert!((day_energy - p * 24.0).abs() < 1e-9);
}

#[test]
fn end_to_end_resample_join_aggregate_scenario() {
    // Forecast: 10:00 -> (p50=2, p10=1, p90=3), 10:30 -> (p50=4, p10=3, p90=5) kW.
    let forecast = [
        ForecastPoint {
            period_end: ts(36_000),
            power_p10: 1.0,
            power_p50: 2.0,
            power_p90: 3.0,
        },
        ForecastPoint {
            period_end: ts(37_800),
            power_p10: 3.0,
            power_p50: 4.0,
            power_p90: 5.0,
        },
    ];
    let fine = resample(&forecast, FINE_STEP_SECS).unwrap();
    assert_eq!(fine.len(), 3);
    assert_eq!(
        fine.iter().map(|p| p.power_p50).collect::<Vec<_>>(),
        vec![2.0, 3.0, 4.0]
    );

    // Flat 1000 currency-units/MWh across the window.
    let prices: Vec<PricePoint> = fine
        .iter()
        .map(|p| PricePoint {
            at: p.period_end,
            price: 1000.0,
        })
        .collect();
    let joined = join(&fine, &prices);
    assert_eq!(joined.mismatches, 0);

    let cum = cumulative(&joined.points, FINE_STEP_SECS);
    let p90_cumulative: Vec<f64> = cum.iter().map(|c| c.energy_p90).collect();
    for (got, want) in p90_cumulative.iter().zip([0.75, 1.75, 3.0]) {
        assert!((got - want).abs() < 1e-12, "cumulative {got} != {want}");
    }

    // At 1000/MWh, one kWh is worth exactly one currency unit.
    let mut prev = 0.0;
    for (c, want) in cum.iter().zip([0.75, 1.0, 1.25]) {
        let interval = c.value_p90 - prev;
        prev = c.value_p90;
        assert!((interval - want).abs() < 1e-12, "value {interval} != {want}");
    }
}

#[test]
fn totals_carry_their_calendar_date() {
    let points = [JoinedPoint {
        at: ts(36_000),
        power_p10: 1.0,
        power_p50: 1.0,
        power_p90: 1.0,
        price: Some(500.0),
    }];
    let totals = daily_totals(&points, FINE_STEP_SECS, chrono_tz::UTC);
    assert_eq!(totals[0].date, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    assert!((totals[0].value_p50 - 0.25 * 0.5).abs() < 1e-12);
}
