//! Metrics for observability.
//!
//! Exports Prometheus-compatible metrics for:
//! - Scan progress (pages, keys, dumped bytes)
//! - Handoff queue throughput
//! - Replay progress (batches, keys restored)
//! - Per-phase round-trip latency
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `migration_` and follow Prometheus
//! conventions: counters end in `_total`, histograms track distributions
//! in seconds. Metrics are purely observational and have no effect on
//! pipeline correctness.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one completed scan page.
pub fn record_page_scanned(keys: usize) {
    counter!("migration_pages_scanned_total").increment(1);
    counter!("migration_keys_scanned_total").increment(keys as u64);
}

/// Record the latency of one pipelined source round trip (SCAN, DUMP or
/// PTTL).
pub fn record_scan_round_trip(operation: &'static str, latency: Duration) {
    histogram!("migration_scan_round_trip_seconds", "operation" => operation)
        .record(latency.as_secs_f64());
}

/// Record a batch entering the handoff queue.
pub fn record_batch_enqueued() {
    counter!("migration_batches_enqueued_total").increment(1);
}

/// Record the handoff queue depth after an enqueue.
pub fn record_queue_depth(depth: usize) {
    gauge!("migration_handoff_queue_depth").set(depth as f64);
}

/// Record one replayed batch.
pub fn record_batch_replayed(keys: usize, latency: Duration) {
    counter!("migration_batches_replayed_total").increment(1);
    counter!("migration_keys_restored_total").increment(keys as u64);
    histogram!("migration_restore_round_trip_seconds").record(latency.as_secs_f64());
}
