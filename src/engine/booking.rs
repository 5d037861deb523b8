use chrono::NaiveDate;

use crate::model::{day_key, noon_utc, NewReservation, Notification, Reservation};
use crate::observability::{
    BOOKINGS_TOTAL, BOOKING_CONFLICTS_TOTAL, BOOKING_VALIDATION_FAILURES_TOTAL,
};

use super::{Engine, EngineError, Visibility};

/// One booking attempt as the customer submitted it. `date` is `None` until
/// a calendar day has been picked; empty strings are missing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: Option<NaiveDate>,
    pub time: String,
    pub service: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl BookingRequest {
    /// Every field present and non-empty, or the first missing one.
    fn validate(&self) -> Result<NaiveDate, EngineError> {
        let date = self.date.ok_or(EngineError::Validation("date"))?;
        for (field, value) in [
            ("time", &self.time),
            ("service", &self.service),
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            if value.is_empty() {
                return Err(EngineError::Validation(field));
            }
        }
        Ok(date)
    }
}

impl Engine {
    /// Commit one booking: `Validating → Committing → {Succeeded |
    /// Rejected(Conflict) | Rejected(Error)}`.
    ///
    /// Validation failures never touch the store. The re-validation read is
    /// awaited before the insert is issued, narrowing (not closing) the race
    /// window against a concurrent booking of the same slot: two commits that
    /// both pass the pre-check will both insert. The store offers no
    /// uniqueness constraint, so that double-booking risk is accepted here,
    /// not hidden.
    ///
    /// The request is borrowed: on `Rejected(Error)` the caller still owns
    /// the typed-in form data and can retry as-is.
    pub async fn submit_booking(&self, request: &BookingRequest) -> Result<Reservation, EngineError> {
        // Validating
        let date = request.validate().inspect_err(|e| {
            metrics::counter!(BOOKING_VALIDATION_FAILURES_TOTAL).increment(1);
            tracing::debug!(error = %e, "booking rejected before commit");
        })?;

        // Committing: fresh read, then insert — strictly in that order.
        let unavailable = self.fresh_unavailable_slots(date, Visibility::Public).await?;
        if unavailable.contains(&request.time) {
            // Reflect the taken slot locally so the caller's slot list is
            // correct without another round-trip.
            self.cache.merge_slot(&day_key(date), &request.time).await;
            metrics::counter!(BOOKING_CONFLICTS_TOTAL).increment(1);
            tracing::info!(date = %date, slot = %request.time, "booking lost slot to earlier commit");
            return Err(EngineError::Conflict {
                date,
                slot: request.time.clone(),
            });
        }

        let row = NewReservation {
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            service: request.service.clone(),
            date: noon_utc(date),
            time: request.time.clone(),
        };
        let created = self
            .store_call(self.store.insert_reservation(row))
            .await
            .map_err(|e| self.store_failure("insert_reservation", e))?;

        // Succeeded
        self.cache.merge_slot(&day_key(date), &created.time).await;
        self.cache.invalidate_fully_blocked().await;
        self.notify.send(Notification::BookingCreated(created.clone()));
        metrics::counter!(BOOKINGS_TOTAL).increment(1);
        tracing::info!(date = %date, slot = %created.time, "booking committed");
        Ok(created)
    }
}
