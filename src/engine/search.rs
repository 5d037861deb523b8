use chrono::{Duration, NaiveDate};

use crate::observability::SEARCH_DAYS_SCANNED;

use super::{Engine, EngineError, Visibility};

/// Result of a successful next-available search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextOpening {
    pub date: NaiveDate,
    pub slot: String,
}

/// Customer-facing text for an exhausted search. Not an error — there simply
/// is no free appointment inside the searched window.
pub fn exhausted_message(days: i64) -> String {
    format!("Kein freier Termin in den nächsten {days} Tagen gefunden")
}

impl Engine {
    /// Scan forward from `max(today, launch_date)` for the first free
    /// (date, slot) pair. Only the business-day filter applies — the search
    /// may look past the customer-visible horizon, its job is to find *any*
    /// future opening. On each candidate day the lowest-ordered free slot
    /// wins, so the result is deterministic for a fixed store state.
    ///
    /// A day whose availability fetch fails is skipped, never treated as
    /// free; `Ok(None)` means the whole horizon is exhausted.
    pub async fn next_available(&self, today: NaiveDate) -> Result<Option<NextOpening>, EngineError> {
        let baseline = today.max(self.config.launch_date);
        let mut scanned = 0u32;

        for offset in 0..=self.config.search_horizon_days {
            let candidate = baseline + Duration::days(offset);
            if !self.config.is_business_day(candidate) {
                continue;
            }
            scanned += 1;

            let unavailable = match self.unavailable_slots(candidate, Visibility::Public).await {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!(date = %candidate, error = %e, "skipping day after failed fetch");
                    continue;
                }
            };

            if let Some(slot) = self
                .config
                .time_slots
                .iter()
                .find(|slot| !unavailable.contains(*slot))
            {
                metrics::histogram!(SEARCH_DAYS_SCANNED).record(scanned as f64);
                tracing::debug!(date = %candidate, slot = %slot, scanned, "next opening found");
                return Ok(Some(NextOpening {
                    date: candidate,
                    slot: slot.clone(),
                }));
            }
        }

        metrics::histogram!(SEARCH_DAYS_SCANNED).record(scanned as f64);
        tracing::info!(
            horizon_days = self.config.search_horizon_days,
            "no free slot within search horizon"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_the_window() {
        assert_eq!(
            exhausted_message(365),
            "Kein freier Termin in den nächsten 365 Tagen gefunden"
        );
    }
}
