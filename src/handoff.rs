//! Bounded handoff queue between the scan and replay tasks.
//!
//! A single-producer, single-consumer conduit of batches. The bound gives
//! backpressure: the scanner suspends when the replayer falls behind, and
//! total buffered memory stays within a small multiple of one scan page's
//! worth of dumps.
//!
//! # Close Semantics
//!
//! The queue is closed exactly once, by dropping the only [`BatchSender`].
//! `BatchSender` is not `Clone`, so the close is structurally one-shot.
//! The consumer observes end-of-data once the queue contents are drained;
//! observing it is idempotent.
//!
//! If the consumer has gone away (the replay task failed), the producer's
//! `send` returns [`MigrationError::HandoffClosed`] and the scan aborts.
//! This is the path by which a mid-run replay failure halts the scanner.

use crate::error::{MigrationError, Result};
use crate::metrics;
use crate::snapshot::Batch;
use tokio::sync::mpsc;

/// Producer half of the handoff queue. Dropping it closes the queue.
pub struct BatchSender {
    tx: mpsc::Sender<Batch>,
    enqueued: u64,
}

/// Consumer half of the handoff queue.
pub struct BatchReceiver {
    rx: mpsc::Receiver<Batch>,
}

/// Create a handoff queue bounded to `capacity` batches.
pub fn handoff(capacity: usize) -> (BatchSender, BatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (BatchSender { tx, enqueued: 0 }, BatchReceiver { rx })
}

impl BatchSender {
    /// Enqueue a batch, suspending while the queue is full.
    ///
    /// Ownership of the batch transfers fully to the queue; the producer
    /// must not retain or mutate it afterwards (the move enforces this).
    pub async fn send(&mut self, batch: Batch) -> Result<()> {
        self.tx
            .send(batch)
            .await
            .map_err(|_| MigrationError::HandoffClosed)?;
        self.enqueued += 1;
        metrics::record_batch_enqueued();
        metrics::record_queue_depth(self.tx.max_capacity() - self.tx.capacity());
        Ok(())
    }

    /// Number of batches enqueued so far.
    pub fn enqueued(&self) -> u64 {
        self.enqueued
    }
}

impl BatchReceiver {
    /// Dequeue the next batch in scan order.
    ///
    /// Suspends while the queue is empty and open. Returns `None` once the
    /// queue is closed and drained.
    pub async fn recv(&mut self) -> Option<Batch> {
        self.rx.recv().await
    }
}
