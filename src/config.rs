use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use tracing::warn;

/// Calendar and schedule constants the core depends on. These are inputs, not
/// business rules baked into the algorithms: the two-weekday schedule and the
/// promotional grace window are tied to the initial launch period and are
/// expected to change.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Bookable time-of-day labels, in canonical order.
    pub time_slots: Vec<String>,
    /// The studio operates a fixed two-day-per-week schedule.
    pub business_days: [Weekday; 2],
    /// First day the service catalog is live; nothing before it is bookable.
    pub launch_date: NaiveDate,
    /// Exclusive end of the promotional grace window. While `today` is before
    /// this date the booking horizon is widened to reach it. `None` disables
    /// the widening.
    pub grace_period_end: Option<NaiveDate>,
    /// Default customer-visible booking horizon, in days from today.
    pub horizon_days: i64,
    /// How far the next-available search may look, in days from its baseline.
    pub search_horizon_days: i64,
    /// Application-level timeout on each store call; expiry is a store error.
    pub store_timeout: Option<Duration>,
    /// Cached availability older than this is re-fetched.
    pub cache_ttl: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            time_slots: [
                "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
                "19:00",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            business_days: [Weekday::Tue, Weekday::Fri],
            launch_date: NaiveDate::from_ymd_opt(2026, 1, 8).expect("valid launch date"),
            grace_period_end: NaiveDate::from_ymd_opt(2026, 2, 1),
            horizon_days: 28,
            search_horizon_days: 365,
            store_timeout: None,
            cache_ttl: Duration::from_secs(30),
        }
    }
}

impl BookingConfig {
    /// Defaults overridden by `TERMIN_*` environment variables. Malformed
    /// values are logged and fall back to the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var("TERMIN_SLOTS") {
            let slots: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if slots.is_empty() {
                warn!("TERMIN_SLOTS is empty, keeping default slot list");
            } else {
                cfg.time_slots = slots;
            }
        }

        if let Ok(raw) = std::env::var("TERMIN_BUSINESS_DAYS") {
            let days: Vec<Weekday> = raw
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            match days.as_slice() {
                [a, b] => cfg.business_days = [*a, *b],
                _ => warn!("TERMIN_BUSINESS_DAYS must name exactly two weekdays, keeping default"),
            }
        }

        if let Some(d) = parse_env("TERMIN_LAUNCH_DATE") {
            cfg.launch_date = d;
        }
        if let Ok(raw) = std::env::var("TERMIN_GRACE_END") {
            // An explicitly empty value disables the grace window.
            cfg.grace_period_end = raw.trim().parse().ok();
        }
        if let Some(n) = parse_env("TERMIN_HORIZON_DAYS") {
            cfg.horizon_days = n;
        }
        if let Some(n) = parse_env("TERMIN_SEARCH_HORIZON_DAYS") {
            cfg.search_horizon_days = n;
        }
        if let Some(ms) = parse_env::<u64>("TERMIN_STORE_TIMEOUT_MS") {
            cfg.store_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(secs) = parse_env::<u64>("TERMIN_CACHE_TTL_SECS") {
            cfg.cache_ttl = Duration::from_secs(secs);
        }

        cfg
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.business_days.contains(&date.weekday())
    }

    pub fn slot_count(&self) -> usize {
        self.time_slots.len()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("invalid {key} value {raw:?}, keeping default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_launch_schedule() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.time_slots.len(), 10);
        assert_eq!(cfg.time_slots[0], "10:00");
        assert_eq!(cfg.business_days, [Weekday::Tue, Weekday::Fri]);
        assert_eq!(cfg.launch_date, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert_eq!(cfg.grace_period_end, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(cfg.horizon_days, 28);
        assert_eq!(cfg.search_horizon_days, 365);
    }

    #[test]
    fn business_day_check() {
        let cfg = BookingConfig::default();
        // 2026-01-13 is a Tuesday, 2026-01-16 a Friday, 2026-01-14 a Wednesday.
        assert!(cfg.is_business_day(NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()));
        assert!(cfg.is_business_day(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()));
        assert!(!cfg.is_business_day(NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()));
    }
}
