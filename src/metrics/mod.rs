//! Prometheus metrics for the canned response service.
//!
//! Covers the write path (create/update/delete/usage), the lookup path
//! (search, shortcut hits and misses), rendering, and backend failures.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "zapticket";

lazy_static! {
    /// Canned responses created
    pub static ref RESPONSES_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_responses_created_total", METRIC_PREFIX),
        "Total canned responses created"
    ).unwrap();

    /// Canned responses updated
    pub static ref RESPONSES_UPDATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_responses_updated_total", METRIC_PREFIX),
        "Total canned responses updated"
    ).unwrap();

    /// Canned responses deleted
    pub static ref RESPONSES_DELETED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_responses_deleted_total", METRIC_PREFIX),
        "Total canned responses deleted"
    ).unwrap();

    /// Usage recordings (counter increments)
    pub static ref USAGE_RECORDED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_usage_recorded_total", METRIC_PREFIX),
        "Total canned response usage recordings"
    ).unwrap();

    /// Free-text searches served
    pub static ref SEARCHES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_searches_total", METRIC_PREFIX),
        "Total canned response searches"
    ).unwrap();

    /// Shortcut lookups by outcome
    pub static ref SHORTCUT_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_shortcut_lookups_total", METRIC_PREFIX),
        "Total shortcut lookups",
        &["result"]
    ).unwrap();

    /// Content renders served
    pub static ref RENDERS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_renders_total", METRIC_PREFIX),
        "Total content renders"
    ).unwrap();

    /// Rendered content size in bytes
    pub static ref RENDERED_CONTENT_BYTES: Histogram = register_histogram!(
        format!("{}_rendered_content_bytes", METRIC_PREFIX),
        "Rendered content size in bytes",
        vec![64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0]
    ).unwrap();

    /// Storage backend failures by operation
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_store_errors_total", METRIC_PREFIX),
        "Total storage backend failures",
        &["operation"]
    ).unwrap();
}

/// Record a shortcut lookup outcome.
pub fn record_shortcut_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    SHORTCUT_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
