//! Configuration for the migration engine.
//!
//! This module defines the configuration passed to
//! [`MigrationPipeline::new()`](crate::pipeline::MigrationPipeline::new).
//! The binary builds it from the two CLI URLs; tests construct it
//! programmatically.
//!
//! # Quick Start
//!
//! ```rust
//! use keyhaul::config::MigrationConfig;
//!
//! let config = MigrationConfig::new(
//!     "redis://127.0.0.1:6379/0",
//!     "redis://127.0.0.1:6379/1",
//! );
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default capacity of the handoff queue, in batches.
///
/// Large enough that the scanner can run well ahead of the replayer and
/// smooth out per-page latency variance on either side, while bounding
/// buffered memory to a small multiple of one scan page's worth of dumps.
/// A tunable, not a correctness parameter.
fn default_queue_capacity() -> usize {
    100
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Configuration for a single migration run.
///
/// # Fields
///
/// - `source_url` / `dest_url`: Redis connection URLs identifying host,
///   port, and logical database index (e.g. `redis://127.0.0.1:6379/0`).
/// - `queue_capacity`: bound on the in-flight batch handoff.
/// - `connect_timeout_ms`: per-endpoint connection establishment timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Connection URL of the store to scan.
    pub source_url: String,

    /// Connection URL of the store to replay into.
    pub dest_url: String,

    /// Capacity of the handoff queue, in batches.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Timeout for establishing each store connection, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl MigrationConfig {
    /// Create a config with default tunables for the given endpoints.
    pub fn new(source_url: impl Into<String>, dest_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            dest_url: dest_url.into(),
            queue_capacity: default_queue_capacity(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    /// Create a minimal config for testing with a small queue.
    pub fn for_testing(source_url: &str, dest_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            dest_url: dest_url.to_string(),
            queue_capacity: 4,
            connect_timeout_ms: 1_000,
        }
    }

    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validate the configuration before any connection is attempted.
    ///
    /// Both URLs must parse as Redis connection URLs and the queue must
    /// have room for at least one batch.
    pub fn validate(&self) -> Result<()> {
        if redis::parse_redis_url(&self.source_url).is_none() {
            return Err(MigrationError::Config(format!(
                "invalid source URL: {}",
                self.source_url
            )));
        }
        if redis::parse_redis_url(&self.dest_url).is_none() {
            return Err(MigrationError::Config(format!(
                "invalid destination URL: {}",
                self.dest_url
            )));
        }
        if self.queue_capacity == 0 {
            return Err(MigrationError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
