// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Migration pipeline orchestration.
//!
//! Ties together the three pipeline pieces, data flowing one direction:
//!
//! ```text
//! source store ──▶ scanner ──▶ handoff queue ──▶ replayer ──▶ destination
//!                 (spawned task)   (bounded)     (invoking context)
//! ```
//!
//! Exactly two units of concurrency run for the duration of a migration:
//! the scan task and the replay loop. Each is strictly sequential
//! internally; the handoff queue is the only shared structure, so no
//! further synchronization exists.
//!
//! # All-or-Nothing
//!
//! [`MigrationPipeline::run()`] is the single point every failure
//! propagates to. A scan-side failure closes the queue, the replayer
//! drains what was already enqueued and the scan error is reported. A
//! replay-side failure drops the receiver, which fails the scanner's next
//! send and halts the scan; the replay error is reported as the root
//! cause. There is no mechanism to resume; a failed run is restarted
//! from scratch.

use crate::config::MigrationConfig;
use crate::error::{Endpoint, MigrationError, Result};
use crate::handoff::handoff;
use crate::replayer::replay_batches;
use crate::scanner::scan_keyspace;
use crate::store::{RedisStore, StoreConnection};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a successful migration run.
#[derive(Debug, Clone, Copy)]
pub struct MigrationSummary {
    /// Keys reconstructed on the destination.
    pub keys: u64,
    /// Batches that moved through the handoff queue.
    pub batches: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl std::fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} keys in {} batches ({:.1?})",
            self.keys, self.batches, self.elapsed
        )
    }
}

/// A configured, not-yet-started migration.
pub struct MigrationPipeline {
    config: MigrationConfig,
}

impl MigrationPipeline {
    /// Validate the configuration and build a pipeline.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the migration to completion.
    ///
    /// Connects both endpoints (fatal on failure, no retry), then drives
    /// the scan task and the replay loop until the source keyspace is
    /// exhausted and every batch is replayed.
    pub async fn run(self) -> Result<MigrationSummary> {
        let connect_timeout = self.config.connect_timeout();

        let source = RedisStore::connect(
            &self.config.source_url,
            Endpoint::Source,
            connect_timeout,
        )
        .await?;
        let dest = RedisStore::connect(
            &self.config.dest_url,
            Endpoint::Destination,
            connect_timeout,
        )
        .await?;

        self.run_with_stores(source, dest).await
    }

    /// Drive the pipeline over already-open store connections.
    ///
    /// Split out from [`run()`](Self::run) so tests can substitute mock
    /// stores for the Redis-backed ones.
    pub async fn run_with_stores<S, D>(self, source: S, mut dest: D) -> Result<MigrationSummary>
    where
        S: StoreConnection,
        D: StoreConnection,
    {
        let started = Instant::now();
        info!(
            queue_capacity = self.config.queue_capacity,
            "Starting migration pipeline"
        );

        let (tx, rx) = handoff(self.config.queue_capacity);

        // Scan runs as its own unit of concurrency; replay runs on the
        // invoking context. The pipeline is done when both have finished.
        let scan_task = tokio::spawn(async move {
            let mut source = source;
            scan_keyspace(&mut source, tx).await
        });

        let replay_result = replay_batches(&mut dest, rx).await;

        // The replayer has returned (receiver dropped), so the scan task
        // cannot block on the queue; joining here cannot hang.
        let scan_result = scan_task
            .await
            .map_err(|e| MigrationError::TaskJoin(e.to_string()))?;

        // A replay failure is the root cause even when the scanner also
        // failed afterwards (its send finds the queue closed).
        let stats = replay_result?;
        let keys_scanned = scan_result?;

        debug!(
            keys_scanned,
            keys_replayed = stats.keys,
            "Pipeline totals agree"
        );

        let summary = MigrationSummary {
            keys: stats.keys,
            batches: stats.batches,
            elapsed: started.elapsed(),
        };
        info!(
            keys = summary.keys,
            batches = summary.batches,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Migration complete"
        );
        Ok(summary)
    }
}
