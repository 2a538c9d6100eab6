//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversion runs (results, per-stage durations)
//! - Downloads (bytes ingested)
//! - Staging (files currently on disk or reserved)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Pipeline
// =============================================================================

/// Conversion runs by terminal result ("complete" or an error category).
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tunegrab_conversions_total", "Total conversion runs"),
        &["result"],
    )
    .unwrap()
});

/// Duration of each pipeline stage in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tunegrab_stage_duration_seconds",
            "Duration of conversion pipeline stages",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["stage"], // "resolve", "download", "transcode", "read"
    )
    .unwrap()
});

// =============================================================================
// Download
// =============================================================================

/// Bytes written to staged input files.
pub static DOWNLOADED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tunegrab_downloaded_bytes_total",
        "Total bytes downloaded from resolved sources",
    )
    .unwrap()
});

// =============================================================================
// Staging
// =============================================================================

/// Staged files allocated and not yet released.
pub static STAGED_FILES_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tunegrab_staged_files_active",
        "Number of staged scratch files currently reserved",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(DOWNLOADED_BYTES.clone()),
        Box::new(STAGED_FILES_ACTIVE.clone()),
    ]
}
