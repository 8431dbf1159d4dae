//! Time-series algebra: resampling, joining, and aggregation.
//!
//! All functions here are pure and deterministic; wall time and
//! timezones enter only as explicit arguments.

/// Per-interval energy/value derivation and daily folds.
pub mod aggregate;
/// Exact-match timestamp join of forecast and price series.
pub mod join;
/// Coarse-to-fine linear interpolation of the forecast bands.
pub mod resample;

pub use aggregate::{cumulative, daily_totals, split_at};
pub use join::{JoinOutcome, join};
pub use resample::resample;
