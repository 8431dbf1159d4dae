//! Per-key daily call budget.
//!
//! The counter tracks *attempted* upstream calls per cache key and
//! resets at local midnight in the configured timezone. Serving from
//! the cache never consumes budget.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use solarbudget_core::{CacheKey, Clock, SolarBudgetError};
use solarbudget_types::{RateLimitConfig, RateLimitState};

struct DayCounter {
    day: NaiveDate,
    used: u32,
}

/// Enforces the daily upstream call ceiling, one counter per key.
pub struct DailyQuota {
    limit: u32,
    tz: Tz,
    clock: Arc<dyn Clock>,
    counters: Mutex<HashMap<CacheKey, DayCounter>>,
}

impl DailyQuota {
    /// Create a quota tracker over the given local timezone.
    pub fn new(config: RateLimitConfig, tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit: config.daily_limit,
            tz,
            clock,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one unit of today's budget for `key`, or refuse.
    ///
    /// Counters from previous local days are dropped before the check,
    /// so the first call after midnight always succeeds and keys that
    /// stop being asked for do not accumulate state.
    ///
    /// # Errors
    /// Returns `SolarBudgetError::RateLimitExceeded` when `key` has
    /// already used its daily budget; no upstream call must be made.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn try_consume(&self, key: &CacheKey) -> Result<(), SolarBudgetError> {
        let today = self.local_date();
        let mut counters = self.counters.lock().expect("mutex poisoned");
        counters.retain(|_, counter| counter.day == today);
        let counter = counters.entry(*key).or_insert(DayCounter {
            day: today,
            used: 0,
        });
        if counter.used >= self.limit {
            return Err(SolarBudgetError::RateLimitExceeded {
                key: key.to_string(),
                limit: self.limit,
                used: counter.used,
                resets_at: self.next_local_midnight(today),
            });
        }
        counter.used += 1;
        Ok(())
    }

    /// Snapshot of every counter tracked for the current local day,
    /// sorted by key. Counters from previous days are dropped.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn state(&self) -> Vec<RateLimitState> {
        let today = self.local_date();
        let mut counters = self.counters.lock().expect("mutex poisoned");
        counters.retain(|_, counter| counter.day == today);
        let mut out: Vec<RateLimitState> = counters
            .iter()
            .map(|(key, counter)| RateLimitState {
                key: key.to_string(),
                limit: self.limit,
                used: counter.used,
                resets_at: self.next_local_midnight(today),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    fn local_date(&self) -> NaiveDate {
        self.clock.now_utc().with_timezone(&self.tz).date_naive()
    }

    fn next_local_midnight(&self, today: NaiveDate) -> DateTime<Utc> {
        let next = today.succ_opt().unwrap_or(today);
        let naive = next.and_time(NaiveTime::MIN);
        // Midnight can be ambiguous or skipped around a DST change;
        // the earlier mapping wins, falling back to the naive instant
        // read as UTC when the local midnight does not exist.
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
    }
}
