//! # Keyhaul
//!
//! A one-shot migration engine that copies the entire keyspace of one
//! Redis instance to another, preserving each key's serialized value and
//! remaining expiry, without requiring the two instances to be reachable
//! from each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              keyhaul                                │
//! │                                                                     │
//! │  ┌──────────────┐      ┌───────────────┐      ┌──────────────────┐  │
//! │  │   Scanner    │─────▶│ Handoff Queue │─────▶│     Replayer     │  │
//! │  │ (SCAN + DUMP │      │ (bounded FIFO │      │ (RESTORE REPLACE │  │
//! │  │  + PTTL)     │      │  of batches)  │      │  per batch)      │  │
//! │  └──────────────┘      └───────────────┘      └──────────────────┘  │
//! │         │                                              │            │
//! │         ▼                                              ▼            │
//! │    source store                                 destination store   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scanner streams an unbounded keyspace through fixed memory: one
//! cursor-paged SCAN round trip per page, then one pipelined DUMP round
//! trip and one pipelined PTTL round trip for the whole page. Batches
//! cross a bounded queue (backpressure) to the replayer, which
//! reconstructs every key with its captured lifetime in one pipelined
//! round trip per batch.
//!
//! There is no resumability and no partial-success bookkeeping: any store
//! error aborts the whole run.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keyhaul::{MigrationConfig, MigrationPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MigrationConfig::new(
//!         "redis://127.0.0.1:6379/0",
//!         "redis://127.0.0.1:6379/1",
//!     );
//!     let summary = MigrationPipeline::new(config)?.run().await?;
//!     println!("migrated {}", summary);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handoff;
pub mod metrics;
pub mod pipeline;
pub mod replayer;
pub mod scanner;
pub mod snapshot;
pub mod store;

// Re-exports for convenience
pub use config::MigrationConfig;
pub use error::{Endpoint, MigrationError, Result};
pub use handoff::{handoff, BatchReceiver, BatchSender};
pub use pipeline::{MigrationPipeline, MigrationSummary};
pub use snapshot::{Batch, KeySnapshot, KeyTtl};
pub use store::{RedisStore, ScanCursor, ScanPage, StoreConnection};
