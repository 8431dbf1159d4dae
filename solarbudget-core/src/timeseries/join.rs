use std::collections::HashMap;

use crate::{JoinedPoint, PricePoint, ResampledPoint};

/// Result of joining a resampled forecast with a price series: one
/// output point per input forecast point, plus a count of forecast
/// points that found no matching price.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// Joined points, in forecast order.
    pub points: Vec<JoinedPoint>,
    /// Forecast points with no price at the same normalized instant.
    pub mismatches: usize,
}

/// Join forecast and price series by exact timestamp equality.
///
/// Both sides are normalized to whole-second UTC instants (sub-second
/// components dropped; offsets are already gone in `DateTime<Utc>`), so
/// upstream clock-alignment drift shows up as a counted mismatch rather
/// than a silently shifted match. This is an exact join, not
/// nearest-neighbor: a missing price yields `price: None`.
#[must_use]
pub fn join(resampled: &[ResampledPoint], prices: &[PricePoint]) -> JoinOutcome {
    let by_instant: HashMap<i64, f64> = prices
        .iter()
        .map(|p| (p.at.timestamp(), p.price))
        .collect();

    let mut mismatches = 0usize;
    let points = resampled
        .iter()
        .map(|f| {
            let price = by_instant.get(&f.period_end.timestamp()).copied();
            if price.is_none() {
                mismatches += 1;
            }
            JoinedPoint {
                at: f.period_end,
                power_p10: f.power_p10,
                power_p50: f.power_p50,
                power_p90: f.power_p90,
                price,
            }
        })
        .collect();

    JoinOutcome { points, mismatches }
}
