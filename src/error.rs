// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the migration engine.
//!
//! This module defines the error types used throughout the migration engine.
//! Errors are categorized by where they occur in the pipeline and carry the
//! store operation that failed.
//!
//! # Error Categories
//!
//! | Error Type | Phase | Description |
//! |------------|-------|-------------|
//! | `Connect` | Startup | Source or destination unreachable |
//! | `Config` | Startup | Invalid URL or capacity |
//! | `Redis` | Scan/Replay | SCAN, DUMP, PTTL or RESTORE failed |
//! | `HandoffClosed` | Scan | Replay side went away mid-run |
//! | `TaskJoin` | Teardown | A pipeline task panicked |
//!
//! # Propagation
//!
//! Every error is fatal to the run. There is no retry and no local recovery
//! anywhere in the pipeline: each variant propagates up to
//! [`MigrationPipeline::run()`](crate::pipeline::MigrationPipeline::run),
//! which halts both tasks and reports. A single failed key aborts the whole
//! migration; a failed run must be restarted from scratch.

use thiserror::Error;

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Which end of the pipeline a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// Errors that can occur during a migration run.
///
/// Each variant includes context about where the error occurred. All
/// variants are fatal: the run holds no checkpoint state, so it cannot be
/// resumed and must be restarted from scratch.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Failed to establish a store connection at startup.
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: Endpoint, message: String },

    /// Redis command error during scan or replay.
    ///
    /// `operation` names the store primitive that failed (SCAN, DUMP,
    /// PTTL, RESTORE).
    #[error("Redis error ({operation}): {message}")]
    Redis {
        operation: String,
        message: String,
        #[source]
        source: Option<redis::RedisError>,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The handoff queue's consumer went away while batches were still
    /// being produced. The replay task has already failed; its error is
    /// the root cause.
    #[error("handoff queue closed: replay side is gone")]
    HandoffClosed,

    /// A pipeline task could not be joined (panic).
    #[error("pipeline task failed: {0}")]
    TaskJoin(String),
}

impl MigrationError {
    /// Create a Redis error from a redis::RedisError.
    pub fn redis(operation: impl Into<String>, source: redis::RedisError) -> Self {
        Self::Redis {
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a Redis error without source.
    pub fn redis_msg(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Redis {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error for one endpoint.
    pub fn connect(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Connect {
            endpoint,
            message: message.into(),
        }
    }
}
