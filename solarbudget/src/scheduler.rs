//! Background cache warming.
//!
//! A single task periodically reads the forecast key, today's price
//! key, and (from the local publication hour onward) tomorrow's price
//! key. Reading through the cache store means a warm entry inside its
//! TTL costs nothing and an expired one triggers a rate-limited,
//! retried refresh. Failures are logged and the loop keeps running.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use rand::Rng;
use solarbudget_core::{CacheKey, TaskHandle};
use tokio::sync::oneshot;

use crate::SolarBudget;

impl SolarBudget {
    /// Spawn the refresh loop. Must be called under a Tokio runtime.
    ///
    /// The loop warms immediately, then ticks at the configured
    /// interval plus jitter until the handle is stopped or dropped.
    #[must_use]
    pub fn start_refresh(self: &Arc<Self>) -> TaskHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let budget = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                budget.warm_all().await;
                let pause = jittered(budget.cfg.refresh.interval, budget.cfg.refresh.jitter_percent);
                tokio::select! {
                    _ = &mut stop_rx => break,
                    () = tokio::time::sleep(pause) => {}
                }
            }
            tracing::debug!("refresh loop stopped");
        });
        TaskHandle::new(handle, stop_tx)
    }

    async fn warm_all(&self) {
        for key in self.warm_keys() {
            if let Err(err) = self.store.read(&key).await {
                tracing::warn!(key = %key, error = %err, "background refresh failed");
            }
        }
    }

    fn warm_keys(&self) -> Vec<CacheKey> {
        let local = self.clock.now_utc().with_timezone(&self.cfg.timezone);
        let today = local.date_naive();
        let mut keys = vec![CacheKey::Forecast, CacheKey::Price(today)];
        // Tomorrow's prices only exist upstream after the publication
        // hour; asking earlier would burn quota on empty answers.
        if local.hour() >= self.cfg.price_publication_hour
            && let Some(tomorrow) = today.succ_opt()
        {
            keys.push(CacheKey::Price(tomorrow));
        }
        keys
    }
}

fn jittered(base: Duration, jitter_percent: u8) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let span = base_ms / 100 * u64::from(jitter_percent);
    let extra = if span == 0 {
        0
    } else {
        rand::rng().random_range(0..=span)
    };
    Duration::from_millis(base_ms.saturating_add(extra))
}
