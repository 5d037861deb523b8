use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;

use crate::model::{day_key, Block, DayKey, PublicReservation};
use crate::store::StoreError;

use super::{Engine, EngineError, Visibility};

// ── Availability Algorithm ────────────────────────────────────────

/// Union of slot labels taken on `day` by reservations and blocks. Row dates
/// are normalized to the calendar day; records on other days are ignored.
pub fn unavailable_for_day(
    day: NaiveDate,
    reservations: &[PublicReservation],
    blocks: &[Block],
) -> BTreeSet<String> {
    let mut slots = BTreeSet::new();
    for r in reservations {
        if r.day() == day {
            slots.insert(r.time.clone());
        }
    }
    for b in blocks {
        if b.day() == day {
            slots.insert(b.time.clone());
        }
    }
    slots
}

/// Dates whose combined reservation+block coverage reaches every configured
/// slot. Coverage counts distinct slot labels, so duplicate rows for the same
/// (date, slot) pair cannot mark a day full early.
pub fn fully_blocked_days(
    slot_count: usize,
    reservations: &[PublicReservation],
    blocks: &[Block],
) -> HashSet<DayKey> {
    let mut per_day: HashMap<DayKey, BTreeSet<&str>> = HashMap::new();
    for r in reservations {
        per_day.entry(day_key(r.day())).or_default().insert(r.time.as_str());
    }
    for b in blocks {
        per_day.entry(day_key(b.day())).or_default().insert(b.time.as_str());
    }
    per_day
        .into_iter()
        .filter(|(_, slots)| slots.len() >= slot_count)
        .map(|(day, _)| day)
        .collect()
}

impl Engine {
    /// Unavailable slot labels for `date`, read through the cache. A failed
    /// fetch is an error, never an empty set — callers must not mistake a
    /// broken backend for a free day.
    pub async fn unavailable_slots(
        &self,
        date: NaiveDate,
        visibility: Visibility,
    ) -> Result<BTreeSet<String>, EngineError> {
        if let Some(hit) = self.cache.day(&day_key(date)).await {
            return Ok(hit);
        }
        self.fresh_unavailable_slots(date, visibility).await
    }

    /// Bypass the cache: the commit protocol's re-validation must observe
    /// live store state. The cache is refreshed with what was fetched.
    pub(super) async fn fresh_unavailable_slots(
        &self,
        date: NaiveDate,
        visibility: Visibility,
    ) -> Result<BTreeSet<String>, EngineError> {
        let (reservations, blocks) = self.fetch_rows(visibility).await?;
        let slots = unavailable_for_day(date, &reservations, &blocks);
        self.cache.put_day(day_key(date), slots.clone()).await;
        Ok(slots)
    }

    /// Dates with no free slot left, recomputed whenever reservations or
    /// blocks change (the cache is invalidated on every mutation).
    pub async fn fully_blocked_dates(
        &self,
        visibility: Visibility,
    ) -> Result<HashSet<DayKey>, EngineError> {
        if let Some(hit) = self.cache.fully_blocked().await {
            return Ok(hit);
        }
        let (reservations, blocks) = self.fetch_rows(visibility).await?;
        let full = fully_blocked_days(self.config.slot_count(), &reservations, &blocks);
        self.cache.put_fully_blocked(full.clone()).await;
        Ok(full)
    }

    /// Both collections, fetched concurrently. Admin reads the full
    /// reservations table; Public only ever touches the PII-free projection.
    pub(super) async fn fetch_rows(
        &self,
        visibility: Visibility,
    ) -> Result<(Vec<PublicReservation>, Vec<Block>), EngineError> {
        let fetched: Result<(Vec<PublicReservation>, Vec<Block>), StoreError> = match visibility {
            Visibility::Public => {
                futures::try_join!(
                    self.store_call(self.store.public_reservations()),
                    self.store_call(self.store.blocks()),
                )
            }
            Visibility::Admin => {
                futures::try_join!(
                    async {
                        let rows = self.store_call(self.store.reservations()).await?;
                        let projected: Vec<PublicReservation> =
                            rows.iter().map(PublicReservation::from).collect();
                        Ok::<_, StoreError>(projected)
                    },
                    self.store_call(self.store.blocks()),
                )
            }
        };
        fetched.map_err(|e| self.store_failure("fetch_availability", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::noon_utc;
    use ulid::Ulid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn reservation(d: u32, time: &str) -> PublicReservation {
        PublicReservation {
            date: noon_utc(date(d)),
            time: time.into(),
        }
    }

    fn block(d: u32, time: &str) -> Block {
        Block {
            id: Ulid::new(),
            date: noon_utc(date(d)),
            time: time.into(),
            reason: None,
        }
    }

    #[test]
    fn unions_reservations_and_blocks() {
        let slots = unavailable_for_day(
            date(13),
            &[reservation(13, "10:00"), reservation(13, "12:00")],
            &[block(13, "11:00")],
        );
        let expected: BTreeSet<String> =
            ["10:00", "11:00", "12:00"].iter().map(|s| s.to_string()).collect();
        assert_eq!(slots, expected);
    }

    #[test]
    fn other_days_are_ignored() {
        let slots = unavailable_for_day(
            date(13),
            &[reservation(16, "10:00")],
            &[block(20, "10:00")],
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn overlapping_labels_deduplicate() {
        // Same slot both reserved and blocked counts once.
        let slots = unavailable_for_day(
            date(13),
            &[reservation(13, "10:00")],
            &[block(13, "10:00")],
        );
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn fully_blocked_requires_every_slot() {
        let reservations = [reservation(13, "10:00")];
        let blocks = [block(13, "11:00")];
        let full = fully_blocked_days(3, &reservations, &blocks);
        assert!(full.is_empty());

        let blocks = [block(13, "11:00"), block(13, "12:00")];
        let full = fully_blocked_days(3, &reservations, &blocks);
        assert_eq!(full, ["2026-01-13".to_string()].into_iter().collect());
    }

    #[test]
    fn duplicate_rows_do_not_fill_a_day() {
        // Three rows, but only two distinct slots.
        let blocks = [block(13, "10:00"), block(13, "10:00"), block(13, "11:00")];
        let full = fully_blocked_days(3, &[], &blocks);
        assert!(full.is_empty());
    }

    #[test]
    fn fully_blocked_tracks_each_day_independently() {
        let blocks = [
            block(13, "10:00"),
            block(13, "11:00"),
            block(16, "10:00"),
        ];
        let full = fully_blocked_days(2, &[], &blocks);
        assert_eq!(full, ["2026-01-13".to_string()].into_iter().collect());
    }
}
