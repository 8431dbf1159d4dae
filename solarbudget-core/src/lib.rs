//! solarbudget-core
//!
//! Core types, source traits, and time-series utilities shared across
//! the solarbudget workspace.
//!
//! - `types`: domain structures (forecast/price points, joined points,
//!   daily totals, cache keys).
//! - `source`: the typed source traits and the key-level
//!   `PayloadSource` contract wrapped by the middleware stack.
//! - `ingest`: validation applied to upstream payloads before they may
//!   enter the cache.
//! - `timeseries`: resample / join / aggregate algebra.
//! - `clock`: injected wall-clock seam.
//! - `task`: cancellable background-task handle.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The source traits and `TaskHandle` are coupled to Tokio types;
//! code using them must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Injected wall-clock abstraction.
pub mod clock;
/// Error taxonomy for the whole workspace.
pub mod error;
/// Ingestion-boundary payload validation.
pub mod ingest;
/// Source traits for upstream clients and mocks.
pub mod source;
/// Cancellable background-task handle.
pub mod task;
/// Resampling, joining, and aggregation of the two series.
pub mod timeseries;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::SolarBudgetError;
pub use source::{ForecastSource, PayloadSource, PriceSource};
pub use task::TaskHandle;
pub use timeseries::{JoinOutcome, cumulative, daily_totals, join, resample, split_at};
pub use types::*;
