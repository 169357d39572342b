//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Rejection workflows (reject, soft delete)
//! - Library file teardown
//! - Download daemon RPC calls

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

/// Reject workflow runs by result.
pub static REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reardiff_rejections_total", "Total reject workflow runs"),
        &["result"], // "success", "not_found", "error"
    )
    .unwrap()
});

/// Soft delete workflow runs by result.
pub static SOFT_DELETES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reardiff_soft_deletes_total",
            "Total soft delete workflow runs",
        ),
        &["result"], // "success", "not_found", "conflict", "error"
    )
    .unwrap()
});

/// Library file teardown attempts by outcome.
pub static FILE_DELETIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reardiff_file_deletions_total",
            "Total library file teardown attempts",
        ),
        &["outcome"], // "deleted", "missing", "failed", "disabled"
    )
    .unwrap()
});

/// Torrent teardown attempts by outcome.
pub static TORRENT_REMOVALS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reardiff_torrent_removals_total",
            "Total torrent teardown attempts",
        ),
        &["outcome"], // "removed", "not_found", "failed", "skipped"
    )
    .unwrap()
});

/// Daemon RPC requests by method and status.
pub static DAEMON_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reardiff_daemon_requests_total",
            "Total download daemon RPC requests",
        ),
        &["method", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(REJECTIONS_TOTAL.clone()),
        Box::new(SOFT_DELETES_TOTAL.clone()),
        Box::new(FILE_DELETIONS.clone()),
        Box::new(TORRENT_REMOVALS.clone()),
        Box::new(DAEMON_REQUESTS.clone()),
    ]
}
