use chrono::DateTime;

use crate::{ForecastPoint, ResampledPoint, SolarBudgetError};

/// Resample a coarse forecast series onto a finer fixed grid by linear
/// interpolation, each percentile band independently.
///
/// The fine grid is anchored at the first coarse timestamp and steps by
/// `fine_step_secs`; when the grid does not land on the last coarse
/// timestamp, that sample is appended after the gridded points. A fine
/// timestamp coinciding with a coarse sample copies that sample
/// unchanged; the endpoints are always copied, never extrapolated, and
/// no output timestamp falls outside the coarse series' covered range.
///
/// All grid arithmetic is integer seconds, so the output is bit-for-bit
/// identical across runs for the same input. Input already at the fine
/// step passes through unchanged.
///
/// # Errors
/// Returns `Err(SolarBudgetError::InvalidArg)` when `fine_step_secs` is
/// not positive or the input is not strictly ascending by `period_end`.
pub fn resample(
    points: &[ForecastPoint],
    fine_step_secs: i64,
) -> Result<Vec<ResampledPoint>, SolarBudgetError> {
    if fine_step_secs <= 0 {
        return Err(SolarBudgetError::invalid_arg(format!(
            "fine step must be positive, got {fine_step_secs}s"
        )));
    }
    for pair in points.windows(2) {
        if pair[1].period_end <= pair[0].period_end {
            return Err(SolarBudgetError::invalid_arg(format!(
                "forecast series not strictly ascending at {}",
                pair[1].period_end
            )));
        }
    }
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(Vec::new());
    };
    if points.len() == 1 {
        return Ok(vec![*first]);
    }

    let start = first.period_end.timestamp();
    let end = last.period_end.timestamp();
    let mut out = Vec::with_capacity(usize::try_from((end - start) / fine_step_secs + 1).unwrap_or(0));

    // `hi` tracks the first coarse sample at or after the fine timestamp.
    let mut hi = 0usize;
    let mut t = start;
    while t <= end {
        while points[hi].period_end.timestamp() < t {
            hi += 1;
        }
        let upper = &points[hi];
        let t1 = upper.period_end.timestamp();
        if t1 == t {
            out.push(*upper);
        } else {
            let lower = &points[hi - 1];
            let t0 = lower.period_end.timestamp();
            out.push(lerp_point(lower, upper, t, t0, t1)?);
        }
        t += fine_step_secs;
    }
    // Close the covered range on the final coarse sample when the grid
    // stepped past it.
    if out.last().map(|p| p.period_end.timestamp()) != Some(end) {
        out.push(*last);
    }
    Ok(out)
}

#[allow(clippy::cast_precision_loss)]
fn lerp_point(
    lower: &ForecastPoint,
    upper: &ForecastPoint,
    t: i64,
    t0: i64,
    t1: i64,
) -> Result<ResampledPoint, SolarBudgetError> {
    let frac = (t - t0) as f64 / (t1 - t0) as f64;
    // This form makes the midpoint exactly (a + b) / 2: both halvings
    // are exact and the sum rounds once.
    let lerp = |a: f64, b: f64| a * (1.0 - frac) + b * frac;
    let period_end = DateTime::from_timestamp(t, 0).ok_or_else(|| {
        SolarBudgetError::invalid_arg(format!("fine timestamp {t} out of range"))
    })?;
    Ok(ResampledPoint {
        period_end,
        power_p10: lerp(lower.power_p10, upper.power_p10),
        power_p50: lerp(lower.power_p50, upper.power_p50),
        power_p90: lerp(lower.power_p90, upper.power_p90),
    })
}
