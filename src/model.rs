use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Canonical `YYYY-MM-DD` key for a calendar day.
pub type DayKey = String;

pub fn day_key(date: NaiveDate) -> DayKey {
    date.format("%Y-%m-%d").to_string()
}

/// Pin a calendar date to 12:00 UTC for storage. Stored timestamps sit at
/// midday so a timezone conversion cannot shift them onto a neighboring
/// calendar day.
pub fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .expect("12:00:00 is a valid time of day")
        .and_utc()
}

/// Calendar-day view of a stored timestamp. Normalization is calendar-based
/// (take the date component), never instant arithmetic.
pub fn stored_day(ts: &DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// A confirmed customer appointment. Never mutated in place: created by the
/// booking commit protocol, deleted by the administrator.
///
/// At most one reservation should exist per (date, time) pair. The store does
/// not enforce this; only the commit protocol's pre-check does, so the
/// invariant is soft and can be violated by a true concurrent race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    /// Noon-pinned, see [`noon_utc`].
    pub date: DateTime<Utc>,
    /// Slot label from the configured enumeration, e.g. `"10:00"`.
    pub time: String,
}

impl Reservation {
    pub fn day(&self) -> NaiveDate {
        stored_day(&self.date)
    }
}

/// Insert payload for a reservation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: DateTime<Utc>,
    pub time: String,
}

/// PII-free projection of a reservation: only (date, time). This is what the
/// anonymous booking widget reads for its availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicReservation {
    pub date: DateTime<Utc>,
    pub time: String,
}

impl PublicReservation {
    pub fn day(&self) -> NaiveDate {
        stored_day(&self.date)
    }
}

impl From<&Reservation> for PublicReservation {
    fn from(r: &Reservation) -> Self {
        Self {
            date: r.date,
            time: r.time.clone(),
        }
    }
}

/// An administrator-imposed unavailability for one (date, time) pair.
/// De-duplicated client-side on creation; at most one per pair under correct
/// operation (soft invariant, same caveat as [`Reservation`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: Ulid,
    /// Noon-pinned, see [`noon_utc`].
    pub date: DateTime<Utc>,
    pub time: String,
    pub reason: Option<String>,
}

impl Block {
    pub fn day(&self) -> NaiveDate {
        stored_day(&self.date)
    }

    /// Dedup key, `YYYY-MM-DD|HH:MM`.
    pub fn key(&self) -> String {
        slot_key(self.day(), &self.time)
    }
}

/// Insert payload for a block; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlock {
    pub date: DateTime<Utc>,
    pub time: String,
    pub reason: Option<String>,
}

pub fn slot_key(day: NaiveDate, time: &str) -> String {
    format!("{}|{time}", day_key(day))
}

/// Cross-component notifications — a closed set, broadcast on successful
/// mutation. A notification sent while nobody listens is lost; listeners
/// re-query fresh state when they activate, so nothing is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    BookingCreated(Reservation),
    BlocksChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn noon_pinning_survives_day_extraction() {
        let day = date(2026, 1, 13);
        let stored = noon_utc(day);
        assert_eq!(stored.format("%H:%M:%S").to_string(), "12:00:00");
        assert_eq!(stored_day(&stored), day);
    }

    #[test]
    fn day_key_is_iso_date() {
        assert_eq!(day_key(date(2026, 1, 8)), "2026-01-08");
        assert_eq!(day_key(date(2026, 11, 30)), "2026-11-30");
    }

    #[test]
    fn slot_key_format() {
        assert_eq!(slot_key(date(2026, 2, 3), "10:00"), "2026-02-03|10:00");
    }

    #[test]
    fn public_projection_drops_customer_fields() {
        let r = Reservation {
            id: Ulid::new(),
            name: "Erika Musterfrau".into(),
            email: "erika@example.de".into(),
            phone: "+49 170 0000000".into(),
            service: "Kleine Auszeit (45 Min.) - €60".into(),
            date: noon_utc(date(2026, 1, 9)),
            time: "11:00".into(),
        };
        let p = PublicReservation::from(&r);
        assert_eq!(p.day(), r.day());
        assert_eq!(p.time, r.time);
    }

    #[test]
    fn reservation_row_roundtrip() {
        let r = Reservation {
            id: Ulid::new(),
            name: "Max".into(),
            email: "max@example.de".into(),
            phone: "+49 151 1234567".into(),
            service: "Die große Auszeit (80 Min.) - €110".into(),
            date: noon_utc(date(2026, 1, 16)),
            time: "14:00".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        let decoded: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(r, decoded);
    }
}
