// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The replay side of the pipeline: reconstruct keys on the destination.
//!
//! Consumes batches from the handoff queue in scan order. Each batch is
//! replayed as a single pipelined round trip of RESTORE commands carrying
//! the captured dump and the captured remaining lifetime, with replace
//! semantics: an existing destination key of the same name is overwritten
//! unconditionally. No merge, no skip-if-exists.
//!
//! The lifetime applied is the one observed at scan time; the resulting
//! clock skew (the key lives slightly longer on the destination) is
//! accepted. A snapshot that is already logically expired is still
//! restored.
//!
//! # Failure
//!
//! Any store error is fatal. There is no partial-success bookkeeping: a
//! single failed key aborts the batch and the run. When the replayer
//! returns early with an error, the receiver drops, the scanner's next
//! send fails, and the whole pipeline halts.

use crate::error::Result;
use crate::handoff::BatchReceiver;
use crate::metrics;
use crate::store::StoreConnection;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Totals from a completed replay loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayStats {
    /// Keys restored on the destination.
    pub keys: u64,
    /// Batches consumed from the handoff queue.
    pub batches: u64,
}

/// Replay batches until the handoff queue is closed and drained.
///
/// This is the run's natural termination point: once it returns, the
/// pipeline is done.
#[instrument(skip_all)]
pub async fn replay_batches<S: StoreConnection>(
    store: &mut S,
    mut source: BatchReceiver,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    while let Some(batch) = source.recv().await {
        let restore_start = Instant::now();
        // One multi-command round trip per batch; empty batches (empty
        // keyspace) skip the trip entirely inside the store impl.
        store.restore(&batch).await?;
        metrics::record_batch_replayed(batch.len(), restore_start.elapsed());

        stats.keys += batch.len() as u64;
        stats.batches += 1;

        debug!(
            batch_keys = batch.len(),
            batches_replayed = stats.batches,
            "Replayed batch"
        );
        // Batch dropped here: snapshots are consumed and discarded after
        // successful reconstruction.
    }

    info!(keys = stats.keys, batches = stats.batches, "Replay complete");
    Ok(stats)
}
