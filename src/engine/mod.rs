mod availability;
mod blocks;
mod booking;
mod cache;
mod eligibility;
mod error;
mod search;

pub use availability::{fully_blocked_days, unavailable_for_day};
pub use blocks::BlockOutcome;
pub use booking::BookingRequest;
pub use cache::AvailabilityCache;
pub use eligibility::{booking_horizon, date_selectable};
pub use error::EngineError;
pub use search::{exhausted_message, NextOpening};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::config::BookingConfig;
use crate::model::{day_key, Notification};
use crate::notify::NotifyHub;
use crate::store::{DataStore, StoreError};

/// Which reservation collection an availability read may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Anonymous booking widget: only the PII-free projection.
    Public,
    /// Administrator dashboard: the full reservations collection.
    Admin,
}

/// The slot-availability core. Owns its data-access handle, notification hub
/// and availability cache — all injected at construction, nothing global.
pub struct Engine {
    store: Arc<dyn DataStore>,
    config: BookingConfig,
    notify: Arc<NotifyHub>,
    cache: Arc<AvailabilityCache>,
}

impl Engine {
    pub fn new(store: Arc<dyn DataStore>, config: BookingConfig, notify: Arc<NotifyHub>) -> Self {
        let cache = Arc::new(AvailabilityCache::new(config.cache_ttl));
        Self {
            store,
            config,
            notify,
            cache,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn notify_hub(&self) -> &Arc<NotifyHub> {
        &self.notify
    }

    /// Apply the configured application-level timeout to one store call.
    /// Expiry is indistinguishable from any other backend failure.
    async fn store_call<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.config.store_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(StoreError("request timed out".into()))),
            None => fut.await,
        }
    }

    fn store_failure(&self, op: &'static str, e: StoreError) -> EngineError {
        tracing::error!(op, error = %e, "store call failed");
        metrics::counter!(crate::observability::STORE_ERRORS_TOTAL).increment(1);
        EngineError::Store(e.0)
    }

    /// Keep this engine's cache in step with mutations made elsewhere (other
    /// sessions sharing the hub). Abort the returned handle to unsubscribe.
    pub fn spawn_cache_invalidator(&self) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let mut rx = self.notify.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Notification::BlocksChanged) => cache.invalidate_all().await,
                    Ok(Notification::BookingCreated(r)) => {
                        cache.merge_slot(&day_key(r.day()), &r.time).await;
                        cache.invalidate_fully_blocked().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification stream lagged, dropping caches");
                        cache.invalidate_all().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
