use std::net::SocketAddr;

use crate::ledger::LedgerError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: menu operations executed. Labels: op, status.
pub const OPS_TOTAL: &str = "maitred_ops_total";

/// Histogram: reserve latency in seconds.
pub const RESERVE_DURATION_SECONDS: &str = "maitred_reserve_duration_seconds";

/// Counter: reservations booked.
pub const RESERVATIONS_BOOKED_TOTAL: &str = "maitred_reservations_booked_total";

/// Counter: reservations cancelled.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "maitred_reservations_cancelled_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: tables registered in the ledger.
pub const TABLES_ACTIVE: &str = "maitred_tables_active";

/// Histogram: journal group-commit flush duration in seconds.
pub const JOURNAL_FLUSH_DURATION_SECONDS: &str = "maitred_journal_flush_duration_seconds";

/// Histogram: journal group-commit batch size (events per flush).
pub const JOURNAL_FLUSH_BATCH_SIZE: &str = "maitred_journal_flush_batch_size";

/// Install the Prometheus metrics exporter on the given port. No-op if
/// port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a ledger failure to a short status label for metrics.
pub fn error_label(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::InvalidInput(_) => "invalid_input",
        LedgerError::OutsideHours(_) => "outside_hours",
        LedgerError::NoTableAvailable { .. } => "no_table",
        LedgerError::NotFound(_) => "not_found",
        LedgerError::LimitExceeded(_) => "limit_exceeded",
        LedgerError::StorageFailure(_) => "storage_failure",
    }
}
