use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::model::DayKey;

struct Stamped<T> {
    at: Instant,
    value: T,
}

/// Read-through cache for derived availability state: per-day unavailable
/// slot sets and the fully-blocked date set.
///
/// Invalidation rule: any mutation invalidates (the engine calls this
/// directly for its own writes; a notification subscriber covers writes from
/// other sessions), and entries older than the TTL are ignored. Commit
/// outcomes are merged in place so the UI reflects a taken slot without a
/// re-fetch.
pub struct AvailabilityCache {
    ttl: Duration,
    days: RwLock<HashMap<DayKey, Stamped<BTreeSet<String>>>>,
    fully_blocked: RwLock<Option<Stamped<HashSet<DayKey>>>>,
}

impl AvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            days: RwLock::new(HashMap::new()),
            fully_blocked: RwLock::new(None),
        }
    }

    pub async fn day(&self, key: &str) -> Option<BTreeSet<String>> {
        let days = self.days.read().await;
        let entry = days.get(key)?;
        if entry.at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn put_day(&self, key: DayKey, slots: BTreeSet<String>) {
        self.days.write().await.insert(
            key,
            Stamped {
                at: Instant::now(),
                value: slots,
            },
        );
    }

    /// Union one slot into an existing day entry. Entries are never created
    /// here: a missing entry means the next read fetches fresh state, which
    /// already includes the slot.
    pub async fn merge_slot(&self, key: &str, slot: &str) {
        if let Some(entry) = self.days.write().await.get_mut(key) {
            entry.value.insert(slot.to_string());
        }
    }

    pub async fn fully_blocked(&self) -> Option<HashSet<DayKey>> {
        let guard = self.fully_blocked.read().await;
        let entry = guard.as_ref()?;
        if entry.at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn put_fully_blocked(&self, set: HashSet<DayKey>) {
        *self.fully_blocked.write().await = Some(Stamped {
            at: Instant::now(),
            value: set,
        });
    }

    /// A new booking changes which dates are full but leaves other days'
    /// slot sets alone.
    pub async fn invalidate_fully_blocked(&self) {
        *self.fully_blocked.write().await = None;
    }

    pub async fn invalidate_all(&self) {
        self.days.write().await.clear();
        *self.fully_blocked.write().await = None;
    }
}
