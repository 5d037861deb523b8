use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::config::BookingConfig;
use crate::model::{day_key, DayKey};

use super::{Engine, EngineError, Visibility};

/// Exclusive upper bound of the customer-visible booking window: normally
/// `today + horizon_days`, widened to the grace-period end while today still
/// falls inside the promotional window. The wider horizon wins.
pub fn booking_horizon(today: NaiveDate, cfg: &BookingConfig) -> NaiveDate {
    let standard = today + Duration::days(cfg.horizon_days);
    match cfg.grace_period_end {
        Some(grace_end) if today < grace_end => standard.max(grace_end),
        _ => standard,
    }
}

/// Calendar rules alone: bounds and business-day filter, no store state.
/// All comparisons are calendar-day comparisons; there is no time-of-day
/// component to zero out.
pub fn within_booking_window(date: NaiveDate, today: NaiveDate, cfg: &BookingConfig) -> bool {
    let lower = today.max(cfg.launch_date);
    if date < lower {
        return false;
    }
    if date >= booking_horizon(today, cfg) {
        return false;
    }
    cfg.is_business_day(date)
}

/// Whether `date` may be offered as a booking target at all.
pub fn date_selectable(
    date: NaiveDate,
    today: NaiveDate,
    fully_blocked: &HashSet<DayKey>,
    cfg: &BookingConfig,
) -> bool {
    within_booking_window(date, today, cfg) && !fully_blocked.contains(&day_key(date))
}

impl Engine {
    /// Eligibility with the fully-blocked set recomputed through the cache.
    /// Dates that already fail the calendar rules never cost a store read.
    pub async fn date_selectable(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<bool, EngineError> {
        if !within_booking_window(date, today, &self.config) {
            return Ok(false);
        }
        let full = self.fully_blocked_dates(Visibility::Public).await?;
        Ok(!full.contains(&day_key(date)))
    }
}
