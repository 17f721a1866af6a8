// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The unit of transfer: one key's serialized value and remaining lifetime.
//!
//! A [`KeySnapshot`] is created by the scanner when it dumps a key, moves
//! through the handoff queue inside a [`Batch`], and is consumed by the
//! replayer. Snapshots are never mutated after creation.
//!
//! # TTL Semantics
//!
//! The remaining lifetime is measured at scan time and re-applied verbatim
//! at replay time. The key therefore persists slightly longer on the
//! destination than it would have on the source. This skew is bounded by
//! pipeline latency and accepted; the lifetime is never re-based against
//! replay time.
//!
//! PTTL replies map as follows:
//!
//! | Reply | Meaning | [`KeyTtl`] |
//! |-------|---------|------------|
//! | `>= 0` | remaining millis | `Millis(n)` |
//! | `-1` | key has no expiry | `NoExpiry` |
//! | `-2` | key gone at PTTL time | `NoExpiry` (benign miss) |
//!
//! RESTORE expects `0` for "no expiry", so [`KeyTtl::restore_arg`] folds
//! `NoExpiry` to `0`.

/// Remaining lifetime of a key, captured at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key never expires.
    NoExpiry,
    /// Milliseconds remaining until expiry, as measured at scan time.
    Millis(u64),
}

impl KeyTtl {
    /// Interpret a raw PTTL reply.
    ///
    /// Negative replies (`-1` no expiry, `-2` no such key) are benign and
    /// collapse to [`KeyTtl::NoExpiry`]; they are not errors.
    pub fn from_pttl_reply(reply: i64) -> Self {
        if reply < 0 {
            Self::NoExpiry
        } else {
            Self::Millis(reply as u64)
        }
    }

    /// The TTL argument to pass to RESTORE (`0` means "no expiry").
    pub fn restore_arg(&self) -> u64 {
        match self {
            Self::NoExpiry => 0,
            Self::Millis(ms) => *ms,
        }
    }

    /// Check if this key never expires.
    pub fn is_no_expiry(&self) -> bool {
        matches!(self, Self::NoExpiry)
    }
}

/// A single key's snapshot: name, engine-native dump, remaining lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySnapshot {
    /// Key name (opaque bytes; Redis keys are binary-safe).
    pub key: Vec<u8>,
    /// DUMP payload: a full, type-preserving serialization of the value,
    /// not a plain read. Opaque to this engine.
    pub dump: Vec<u8>,
    /// Remaining lifetime at scan time.
    pub ttl: KeyTtl,
}

impl KeySnapshot {
    pub fn new(key: Vec<u8>, dump: Vec<u8>, ttl: KeyTtl) -> Self {
        Self { key, dump, ttl }
    }
}

/// One scan page's worth of snapshots.
///
/// Keys are unique within a batch; no ordering guarantee among them.
/// Ownership transfers fully into the handoff queue on enqueue and to the
/// replayer on dequeue.
pub type Batch = Vec<KeySnapshot>;

/// Assemble a batch from position-aligned page results.
///
/// `keys`, `dumps` and `ttls` come from the same scan page: one pipelined
/// DUMP round trip and one pipelined PTTL round trip, aligned by position.
/// A key whose dump is `None` vanished between SCAN and DUMP; it has no
/// value to transfer and is dropped from the batch (benign miss, not an
/// error).
pub fn assemble_batch(
    keys: Vec<Vec<u8>>,
    dumps: Vec<Option<Vec<u8>>>,
    ttls: Vec<KeyTtl>,
) -> Batch {
    debug_assert_eq!(keys.len(), dumps.len());
    debug_assert_eq!(keys.len(), ttls.len());

    keys.into_iter()
        .zip(dumps)
        .zip(ttls)
        .filter_map(|((key, dump), ttl)| dump.map(|dump| KeySnapshot::new(key, dump, ttl)))
        .collect()
}
