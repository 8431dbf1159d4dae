use solarbudget_types::{CacheStatus, SolarBudgetConfig};

#[test]
fn config_round_trips_through_json() {
    let cfg = SolarBudgetConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    let back: SolarBudgetConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.rate_limit.daily_limit, cfg.rate_limit.daily_limit);
    assert_eq!(back.cache.ttl, cfg.cache.ttl);
    assert_eq!(back.timezone, chrono_tz::Europe::Warsaw);
    assert_eq!(back.price_publication_hour, 16);
}

#[test]
fn cache_status_uses_lowercase_wire_form() {
    assert_eq!(serde_json::to_string(&CacheStatus::Fresh).unwrap(), "\"fresh\"");
    assert_eq!(serde_json::to_string(&CacheStatus::Stale).unwrap(), "\"stale\"");
}
