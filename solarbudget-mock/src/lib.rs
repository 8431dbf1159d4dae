//! solarbudget-mock
//!
//! Deterministic in-memory test doubles: a manually advanced clock and
//! mock sources with call counters and failure injection. Used by the
//! middleware and facade test suites; never compiled into production
//! builds.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use solarbudget_core::{
    CacheKey, Clock, FINE_STEP_SECS, ForecastPoint, ForecastSource, PayloadSource, PricePoint,
    PriceSource, SolarBudgetError,
};

/// A [`Clock`] whose instant only moves when a test says so.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// A clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("mutex poisoned") = now;
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let delta = TimeDelta::from_std(step).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().expect("mutex poisoned");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("mutex poisoned")
    }
}

/// Shared failure/counter switchboard for the mock sources.
#[derive(Default)]
struct Switches {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl Switches {
    fn record_call(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fail.load(Ordering::SeqCst)
    }
}

/// In-memory [`PayloadSource`] returning a configurable JSON payload.
pub struct MockPayloadSource {
    name: &'static str,
    payload: Mutex<serde_json::Value>,
    switches: Switches,
}

impl MockPayloadSource {
    /// A source named `name` answering every key with `payload`.
    #[must_use]
    pub fn new(name: &'static str, payload: serde_json::Value) -> Self {
        Self {
            name,
            payload: Mutex::new(payload),
            switches: Switches::default(),
        }
    }

    /// Replace the payload served from now on.
    pub fn set_payload(&self, payload: serde_json::Value) {
        *self.payload.lock().expect("mutex poisoned") = payload;
    }

    /// When `fail` is true every fetch returns an upstream error.
    pub fn set_failing(&self, fail: bool) {
        self.switches.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetch attempts made so far, failures included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.switches.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayloadSource for MockPayloadSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _key: &CacheKey) -> Result<serde_json::Value, SolarBudgetError> {
        if self.switches.record_call() {
            return Err(SolarBudgetError::upstream(self.name, "injected failure"));
        }
        Ok(self.payload.lock().expect("mutex poisoned").clone())
    }
}

/// In-memory [`ForecastSource`] serving a fixed series.
pub struct MockForecastSource {
    points: Mutex<Vec<ForecastPoint>>,
    switches: Switches,
}

impl MockForecastSource {
    /// A source serving exactly `points`.
    #[must_use]
    pub fn with_points(points: Vec<ForecastPoint>) -> Self {
        Self {
            points: Mutex::new(points),
            switches: Switches::default(),
        }
    }

    /// Replace the served series.
    pub fn set_points(&self, points: Vec<ForecastPoint>) {
        *self.points.lock().expect("mutex poisoned") = points;
    }

    /// When `fail` is true every fetch returns an upstream error.
    pub fn set_failing(&self, fail: bool) {
        self.switches.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetch attempts made so far, failures included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.switches.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastSource for MockForecastSource {
    fn name(&self) -> &'static str {
        "mock-forecast"
    }

    async fn forecast(&self) -> Result<Vec<ForecastPoint>, SolarBudgetError> {
        if self.switches.record_call() {
            return Err(SolarBudgetError::upstream(self.name(), "injected failure"));
        }
        Ok(self.points.lock().expect("mutex poisoned").clone())
    }
}

/// In-memory [`PriceSource`] keyed by business date.
///
/// Dates with no configured series answer with an empty vector, the
/// same as an upstream that has not published them yet.
pub struct MockPriceSource {
    by_date: Mutex<HashMap<NaiveDate, Vec<PricePoint>>>,
    switches: Switches,
}

impl MockPriceSource {
    /// A source with no published series.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_date: Mutex::new(HashMap::new()),
            switches: Switches::default(),
        }
    }

    /// Publish `points` for `date`.
    pub fn publish(&self, date: NaiveDate, points: Vec<PricePoint>) {
        self.by_date
            .lock()
            .expect("mutex poisoned")
            .insert(date, points);
    }

    /// When `fail` is true every fetch returns an upstream error.
    pub fn set_failing(&self, fail: bool) {
        self.switches.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetch attempts made so far, failures included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.switches.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    fn name(&self) -> &'static str {
        "mock-price"
    }

    async fn prices(&self, date: NaiveDate) -> Result<Vec<PricePoint>, SolarBudgetError> {
        if self.switches.record_call() {
            return Err(SolarBudgetError::upstream(self.name(), "injected failure"));
        }
        Ok(self
            .by_date
            .lock()
            .expect("mutex poisoned")
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }
}

/// A strictly ascending 30-minute forecast ramp starting at `start`,
/// convenient for tests that only care about shape.
#[must_use]
pub fn forecast_ramp(start: DateTime<Utc>, len: usize) -> Vec<ForecastPoint> {
    (0..len)
        .map(|i| {
            let power = i as f64 * 0.5;
            ForecastPoint {
                period_end: start + TimeDelta::seconds(i as i64 * 2 * FINE_STEP_SECS),
                power_p10: power * 0.5,
                power_p50: power,
                power_p90: power * 1.5,
            }
        })
        .collect()
}

/// A flat 15-minute price series covering `len` intervals ending at
/// `start + 15min`, `start + 30min`, ...
#[must_use]
pub fn flat_prices(start: DateTime<Utc>, len: usize, price: f64) -> Vec<PricePoint> {
    (1..=len)
        .map(|i| PricePoint {
            at: start + TimeDelta::seconds(i as i64 * FINE_STEP_SECS),
            price,
        })
        .collect()
}
