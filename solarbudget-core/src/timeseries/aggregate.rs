use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{CumulativePoint, DailyTotal, EnergySplit, JoinedPoint};

/// Prices arrive per MWh while interval energy is in kWh.
const KWH_PER_MWH: f64 = 1000.0;

/// Per-band energy (kWh) for one interval: instantaneous power (kW)
/// times the interval duration as a fraction of an hour.
#[allow(clippy::cast_precision_loss)]
fn interval_energy(p: &JoinedPoint, step_secs: i64) -> (f64, f64, f64) {
    let hours = step_secs as f64 / 3600.0;
    (
        p.power_p10 * hours,
        p.power_p50 * hours,
        p.power_p90 * hours,
    )
}

/// Per-band monetary value for one interval. A missing price contributes
/// zero value; it never zeroes the energy itself.
fn interval_value(p: &JoinedPoint, step_secs: i64) -> (f64, f64, f64) {
    let (e10, e50, e90) = interval_energy(p, step_secs);
    let per_kwh = p.price.map_or(0.0, |price| price / KWH_PER_MWH);
    (e10 * per_kwh, e50 * per_kwh, e90 * per_kwh)
}

/// Running per-band energy and value totals across the whole sequence,
/// one output point per input point. Negative instantaneous power is
/// carried through unchanged; clamping is a display concern.
#[must_use]
pub fn cumulative(points: &[JoinedPoint], step_secs: i64) -> Vec<CumulativePoint> {
    let mut acc = CumulativePoint {
        at: DateTime::<Utc>::MIN_UTC,
        energy_p10: 0.0,
        energy_p50: 0.0,
        energy_p90: 0.0,
        value_p10: 0.0,
        value_p50: 0.0,
        value_p90: 0.0,
    };
    points
        .iter()
        .map(|p| {
            let (e10, e50, e90) = interval_energy(p, step_secs);
            let (v10, v50, v90) = interval_value(p, step_secs);
            acc.at = p.at;
            acc.energy_p10 += e10;
            acc.energy_p50 += e50;
            acc.energy_p90 += e90;
            acc.value_p10 += v10;
            acc.value_p50 += v50;
            acc.value_p90 += v90;
            acc
        })
        .collect()
}

/// Fold the joined sequence into one total per local calendar date.
///
/// The date of an interval is the local date of its end instant in `tz`;
/// running sums reset at each date boundary.
#[must_use]
pub fn daily_totals(points: &[JoinedPoint], step_secs: i64, tz: Tz) -> Vec<DailyTotal> {
    let mut out: Vec<DailyTotal> = Vec::new();
    for p in points {
        let date = local_date(p.at, tz);
        if out.last().is_none_or(|t| t.date != date) {
            out.push(DailyTotal::zero(date));
        }
        let total = out
            .last_mut()
            .expect("pushed a total for this date above");
        let (e10, e50, e90) = interval_energy(p, step_secs);
        let (v10, v50, v90) = interval_value(p, step_secs);
        total.energy_p10 += e10;
        total.energy_p50 += e50;
        total.energy_p90 += e90;
        total.value_p10 += v10;
        total.value_p50 += v50;
        total.value_p90 += v90;
    }
    out
}

/// Split the sequence into produced and remaining energy around `now`.
///
/// The split index is the point nearest `now` by absolute time
/// difference, ties broken toward the earlier index. Everything up to
/// and including that index counts as produced; the rest as remaining.
#[must_use]
pub fn split_at(points: &[JoinedPoint], step_secs: i64, now: DateTime<Utc>) -> EnergySplit {
    let mut split = EnergySplit::default();
    let Some(pivot) = nearest_index(points, now) else {
        return split;
    };
    for (i, p) in points.iter().enumerate() {
        let (e10, e50, e90) = interval_energy(p, step_secs);
        if i <= pivot {
            split.produced_p10 += e10;
            split.produced_p50 += e50;
            split.produced_p90 += e90;
        } else {
            split.remaining_p10 += e10;
            split.remaining_p50 += e50;
            split.remaining_p90 += e90;
        }
    }
    split
}

fn nearest_index(points: &[JoinedPoint], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, p) in points.iter().enumerate() {
        let diff = (p.at.timestamp() - now.timestamp()).abs();
        // Strict comparison keeps the earlier index on a tie.
        if best.is_none_or(|(_, d)| diff < d) {
            best = Some((i, diff));
        }
    }
    best.map(|(i, _)| i)
}

fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FINE_STEP_SECS;

    fn jp(secs: i64, power: f64, price: Option<f64>) -> JoinedPoint {
        JoinedPoint {
            at: DateTime::from_timestamp(secs, 0).unwrap(),
            power_p10: power,
            power_p50: power,
            power_p90: power,
            price,
        }
    }

    #[test]
    fn missing_price_contributes_zero_value_but_full_energy() {
        let totals = daily_totals(
            &[jp(900, 4.0, None)],
            FINE_STEP_SECS,
            chrono_tz::UTC,
        );
        assert_eq!(totals.len(), 1);
        assert!((totals[0].energy_p50 - 1.0).abs() < 1e-12);
        assert_eq!(totals[0].value_p50, 0.0);
    }

    #[test]
    fn split_tie_breaks_toward_earlier_index() {
        let pts = [jp(0, 1.0, None), jp(1800, 1.0, None)];
        // 900 is equidistant from both points.
        let split = split_at(&pts, FINE_STEP_SECS, DateTime::from_timestamp(900, 0).unwrap());
        assert!((split.produced_p50 - 0.25).abs() < 1e-12);
        assert!((split.remaining_p50 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn split_of_empty_sequence_is_zero() {
        let split = split_at(&[], FINE_STEP_SECS, Utc::now());
        assert_eq!(split, EnergySplit::default());
    }

    #[test]
    fn totals_reset_at_local_date_boundary() {
        // 23:45 and 00:00 UTC land on different UTC dates.
        let d0 = 86_400 - 900;
        let pts = [jp(d0, 2.0, Some(1000.0)), jp(86_400, 2.0, Some(1000.0))];
        let totals = daily_totals(&pts, FINE_STEP_SECS, chrono_tz::UTC);
        assert_eq!(totals.len(), 2);
        assert!((totals[0].energy_p50 - 0.5).abs() < 1e-12);
        assert!((totals[1].energy_p50 - 0.5).abs() < 1e-12);
        assert!((totals[0].value_p50 - 0.5).abs() < 1e-12);
    }
}
