// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Store connection contract and its Redis implementation.
//!
//! Defines the interface the pipeline needs from a key-value store. All
//! operations are page-granular so that request pipelining lives inside
//! the implementation: one call, one network round trip, regardless of how
//! many keys the page holds. Network latency is amortized across the whole
//! page rather than paid per key.
//!
//! This trait allows testing with mocks and decouples the scan and replay
//! loops from the redis client.
//!
//! # Cursor Semantics
//!
//! The SCAN paging protocol overloads one integer: `0` is both the cursor
//! that starts a scan and the cursor that ends one. [`ScanCursor`] models
//! the state as a tagged value so the loops never compare raw integers;
//! the dual meaning is confined to the wire-conversion pair
//! ([`ScanCursor::request_arg`] / [`ScanCursor::from_reply`]).

use crate::error::{Endpoint, MigrationError, Result};
use crate::snapshot::{KeySnapshot, KeyTtl};
use redis::aio::ConnectionManager;
use redis::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Type alias for boxed async futures (reduces trait signature complexity).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Position within a paginated full-keyspace scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCursor {
    /// Scan not started yet.
    Start,
    /// Mid-scan, resume from this opaque token.
    Continue(u64),
    /// The store reported the scan complete.
    Done,
}

impl ScanCursor {
    /// The raw cursor to send in the next SCAN request.
    ///
    /// `Done` is never requested; the scan loop terminates on it before
    /// issuing another page.
    pub fn request_arg(&self) -> u64 {
        match self {
            Self::Start => 0,
            Self::Continue(raw) => *raw,
            Self::Done => 0,
        }
    }

    /// Interpret the cursor returned by a SCAN reply.
    ///
    /// A reply cursor of `0` only ever means "scan complete"; `Start`
    /// exists solely so the first request also serializes to `0`.
    pub fn from_reply(raw: u64) -> Self {
        if raw == 0 {
            Self::Done
        } else {
            Self::Continue(raw)
        }
    }

    /// Check if the scan has been reported complete.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// One page of a keyspace scan.
#[derive(Debug, Clone)]
pub struct ScanPage {
    /// Cursor for the next request, or [`ScanCursor::Done`].
    pub next: ScanCursor,
    /// Keys discovered on this page. Length is governed by the store's
    /// own page-size heuristic, not controlled here.
    pub keys: Vec<Vec<u8>>,
}

/// Contract the pipeline needs from a store.
///
/// All four primitives support pipelining: each method is one network
/// round trip for the whole slice it is given. Implementations are used
/// exclusively by a single task, so methods take `&mut self`.
pub trait StoreConnection: Send + 'static {
    /// One SCAN round trip: advance the cursor, return a page of keys.
    fn scan_page(&mut self, cursor: ScanCursor) -> BoxFuture<'_, ScanPage>;

    /// Pipelined DUMPs for a page of keys, aligned by position.
    ///
    /// `None` marks a key that vanished between SCAN and DUMP (benign).
    fn dump_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<Option<Vec<u8>>>>;

    /// Pipelined PTTLs for a page of keys, aligned by position.
    fn ttl_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<KeyTtl>>;

    /// Pipelined RESTOREs for a whole batch, overwriting existing keys.
    fn restore<'a>(&'a mut self, batch: &'a [KeySnapshot]) -> BoxFuture<'a, ()>;
}

/// Redis implementation of the store contract.
///
/// Uses `redis::aio::ConnectionManager` internally, which provides a
/// multiplexed connection (single TCP socket, multiple in-flight
/// requests) configured from a connection URL including the logical
/// database index.
pub struct RedisStore {
    conn: ConnectionManager,
    endpoint: Endpoint,
}

impl RedisStore {
    /// Connect to a store with a bounded establishment time.
    ///
    /// Connection failure here is fatal to the run; there is no retry.
    pub async fn connect(
        url: &str,
        endpoint: Endpoint,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            MigrationError::connect(endpoint, format!("invalid Redis URL: {}", e))
        })?;

        let conn = timeout(connect_timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                MigrationError::connect(
                    endpoint,
                    format!("connection timed out after {:?}", connect_timeout),
                )
            })?
            .map_err(|e| MigrationError::connect(endpoint, e.to_string()))?;

        info!(endpoint = %endpoint, url = %url, "Connected to store");
        Ok(Self { conn, endpoint })
    }

    /// Wrap an already-established connection (integration tests).
    pub fn from_connection(conn: ConnectionManager, endpoint: Endpoint) -> Self {
        Self { conn, endpoint }
    }
}

impl StoreConnection for RedisStore {
    fn scan_page(&mut self, cursor: ScanCursor) -> BoxFuture<'_, ScanPage> {
        Box::pin(async move {
            let (raw_next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
                .arg(cursor.request_arg())
                .query_async(&mut self.conn)
                .await
                .map_err(|e| MigrationError::redis("SCAN", e))?;

            debug!(
                endpoint = %self.endpoint,
                keys = keys.len(),
                done = raw_next == 0,
                "Scanned page"
            );

            Ok(ScanPage {
                next: ScanCursor::from_reply(raw_next),
                keys,
            })
        })
    }

    fn dump_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<Option<Vec<u8>>>> {
        Box::pin(async move {
            if keys.is_empty() {
                return Ok(Vec::new());
            }

            let mut pipe = redis::pipe();
            for key in keys {
                pipe.cmd("DUMP").arg(key);
            }

            // Nil replies (key vanished since SCAN) decode as None.
            let dumps: Vec<Option<Vec<u8>>> = pipe
                .query_async(&mut self.conn)
                .await
                .map_err(|e| MigrationError::redis("DUMP", e))?;

            Ok(dumps)
        })
    }

    fn ttl_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<KeyTtl>> {
        Box::pin(async move {
            if keys.is_empty() {
                return Ok(Vec::new());
            }

            let mut pipe = redis::pipe();
            for key in keys {
                pipe.cmd("PTTL").arg(key);
            }

            let replies: Vec<i64> = pipe
                .query_async(&mut self.conn)
                .await
                .map_err(|e| MigrationError::redis("PTTL", e))?;

            Ok(replies.into_iter().map(KeyTtl::from_pttl_reply).collect())
        })
    }

    fn restore<'a>(&'a mut self, batch: &'a [KeySnapshot]) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if batch.is_empty() {
                return Ok(());
            }

            let mut pipe = redis::pipe();
            for snapshot in batch {
                // REPLACE: an existing key of the same name is overwritten
                // unconditionally.
                pipe.cmd("RESTORE")
                    .arg(&snapshot.key)
                    .arg(snapshot.ttl.restore_arg())
                    .arg(&snapshot.dump)
                    .arg("REPLACE");
            }

            let _: () = pipe
                .query_async(&mut self.conn)
                .await
                .map_err(|e| MigrationError::redis("RESTORE", e))?;

            debug!(endpoint = %self.endpoint, keys = batch.len(), "Restored batch");
            Ok(())
        })
    }
}
