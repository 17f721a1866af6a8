// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The scan side of the pipeline: discover keys, snapshot value and TTL.
//!
//! Performs one complete pass over the source keyspace using cursor-based
//! pagination. Per page:
//!
//! 1. One SCAN round trip discovers a page of keys.
//! 2. One pipelined DUMP round trip fetches every value on the page.
//! 3. One pipelined PTTL round trip fetches every remaining lifetime.
//! 4. Keys, dumps and lifetimes are assembled (aligned by position) into a
//!    batch and enqueued.
//!
//! Two round trips per page, not two per key: latency is amortized across
//! the whole page.
//!
//! # Termination
//!
//! Scan completion is only detectable after the request that reports it,
//! so the final page's batch is enqueued like any other and the sink is
//! then closed by dropping it. An empty keyspace still enqueues one empty
//! batch before closing.
//!
//! # Failure
//!
//! Any store error aborts the scan; there is no page skipping and no
//! retry, because partial scan state cannot be safely resumed (no cursor
//! checkpointing exists). A benign per-key miss (nil DUMP, negative PTTL)
//! is data, not an error.

use crate::error::Result;
use crate::handoff::BatchSender;
use crate::metrics;
use crate::snapshot::assemble_batch;
use crate::store::{ScanCursor, StoreConnection};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Scan the entire source keyspace into the handoff queue.
///
/// Emits every key exactly once as part of some batch, in scan order,
/// then closes the sink by consuming it. Returns the total number of
/// keys snapshotted.
#[instrument(skip_all)]
pub async fn scan_keyspace<S: StoreConnection>(
    store: &mut S,
    mut sink: BatchSender,
) -> Result<u64> {
    let mut cursor = ScanCursor::Start;
    let mut keys_total: u64 = 0;

    loop {
        let scan_start = Instant::now();
        let page = store.scan_page(cursor).await?;
        metrics::record_scan_round_trip("SCAN", scan_start.elapsed());

        let dump_start = Instant::now();
        let dumps = store.dump_keys(&page.keys).await?;
        metrics::record_scan_round_trip("DUMP", dump_start.elapsed());

        let ttl_start = Instant::now();
        let ttls = store.ttl_keys(&page.keys).await?;
        metrics::record_scan_round_trip("PTTL", ttl_start.elapsed());

        metrics::record_page_scanned(page.keys.len());

        let batch = assemble_batch(page.keys, dumps, ttls);
        keys_total += batch.len() as u64;

        debug!(
            batch_keys = batch.len(),
            batches_enqueued = sink.enqueued(),
            "Enqueueing batch"
        );

        // Ownership of the batch moves into the queue here; suspends
        // while the queue is full (backpressure).
        sink.send(batch).await?;

        if page.next.is_done() {
            break;
        }
        cursor = page.next;
    }

    info!(
        keys = keys_total,
        batches = sink.enqueued(),
        "Keyspace scan complete"
    );

    // Dropping the only sender closes the queue, exactly once.
    drop(sink);
    Ok(keys_total)
}
