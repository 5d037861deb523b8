use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: successful booking commits.
pub const BOOKINGS_TOTAL: &str = "terminbuch_bookings_total";

/// Counter: commits rejected because the slot was taken between render and
/// submit.
pub const BOOKING_CONFLICTS_TOTAL: &str = "terminbuch_booking_conflicts_total";

/// Counter: commits rejected by client-side validation.
pub const BOOKING_VALIDATION_FAILURES_TOTAL: &str = "terminbuch_booking_validation_failures_total";

/// Counter: store read/write failures surfaced to callers.
pub const STORE_ERRORS_TOTAL: &str = "terminbuch_store_errors_total";

/// Counter: administrator blocks created.
pub const BLOCKS_CREATED_TOTAL: &str = "terminbuch_blocks_created_total";

/// Counter: administrator blocks deleted.
pub const BLOCKS_DELETED_TOTAL: &str = "terminbuch_blocks_deleted_total";

/// Histogram: days scanned per next-available search.
pub const SEARCH_DAYS_SCANNED: &str = "terminbuch_search_days_scanned";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
