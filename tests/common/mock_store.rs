//! In-memory StoreConnection for pipeline testing.
//!
//! Behaves like a tiny keyspace: SCAN pages over it deterministically,
//! DUMP serializes (identity), RESTORE overwrites. State lives behind an
//! `Arc` so tests can keep a handle for assertions after the store has
//! moved into the pipeline. Failure injection per operation.

#![allow(dead_code)] // Not every test binary uses every helper

use keyhaul::error::MigrationError;
use keyhaul::snapshot::{KeySnapshot, KeyTtl};
use keyhaul::store::{BoxFuture, ScanCursor, ScanPage, StoreConnection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Shared keyspace contents: key -> (dump payload, ttl).
pub type Contents = Arc<Mutex<BTreeMap<Vec<u8>, (Vec<u8>, KeyTtl)>>>;

/// A scriptable in-memory store.
pub struct MemoryStore {
    contents: Contents,
    page_size: usize,
    /// Operation name that should fail ("SCAN", "DUMP", "PTTL", "RESTORE").
    fail_op: Option<&'static str>,
    /// Number of restore batches to accept before `fail_op = "RESTORE"`
    /// kicks in.
    restores_before_failure: usize,
    restore_batches: usize,
}

impl MemoryStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            contents: Arc::new(Mutex::new(BTreeMap::new())),
            page_size,
            fail_op: None,
            restores_before_failure: 0,
            restore_batches: 0,
        }
    }

    /// Make `op` fail on every call.
    pub fn failing(page_size: usize, op: &'static str) -> Self {
        Self {
            fail_op: Some(op),
            ..Self::new(page_size)
        }
    }

    /// Make RESTORE fail after accepting `batches` batches.
    pub fn failing_restore_after(page_size: usize, batches: usize) -> Self {
        Self {
            fail_op: Some("RESTORE"),
            restores_before_failure: batches,
            ..Self::new(page_size)
        }
    }

    /// Seed a key.
    pub fn seed(&self, key: &[u8], dump: &[u8], ttl: KeyTtl) {
        self.contents
            .lock()
            .unwrap()
            .insert(key.to_vec(), (dump.to_vec(), ttl));
    }

    /// Handle to the contents, usable after the store moves into the
    /// pipeline.
    pub fn contents(&self) -> Contents {
        Arc::clone(&self.contents)
    }
}

impl StoreConnection for MemoryStore {
    fn scan_page(&mut self, cursor: ScanCursor) -> BoxFuture<'_, ScanPage> {
        let fail = self.fail_op == Some("SCAN");
        let offset = match cursor {
            ScanCursor::Start => 0,
            ScanCursor::Continue(raw) => raw as usize,
            ScanCursor::Done => 0,
        };
        let all: Vec<Vec<u8>> = self.contents.lock().unwrap().keys().cloned().collect();
        let keys: Vec<Vec<u8>> = all.iter().skip(offset).take(self.page_size).cloned().collect();
        let next_offset = offset + keys.len();
        let next = if next_offset >= all.len() {
            ScanCursor::Done
        } else {
            ScanCursor::Continue(next_offset as u64)
        };
        Box::pin(async move {
            if fail {
                return Err(MigrationError::redis_msg("SCAN", "injected failure"));
            }
            Ok(ScanPage { next, keys })
        })
    }

    fn dump_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<Option<Vec<u8>>>> {
        let fail = self.fail_op == Some("DUMP");
        let contents = self.contents.lock().unwrap();
        let dumps: Vec<Option<Vec<u8>>> = keys
            .iter()
            .map(|k| contents.get(k).map(|(dump, _)| dump.clone()))
            .collect();
        Box::pin(async move {
            if fail {
                return Err(MigrationError::redis_msg("DUMP", "injected failure"));
            }
            Ok(dumps)
        })
    }

    fn ttl_keys<'a>(&'a mut self, keys: &'a [Vec<u8>]) -> BoxFuture<'a, Vec<KeyTtl>> {
        let fail = self.fail_op == Some("PTTL");
        let contents = self.contents.lock().unwrap();
        let ttls: Vec<KeyTtl> = keys
            .iter()
            .map(|k| contents.get(k).map_or(KeyTtl::NoExpiry, |(_, ttl)| *ttl))
            .collect();
        Box::pin(async move {
            if fail {
                return Err(MigrationError::redis_msg("PTTL", "injected failure"));
            }
            Ok(ttls)
        })
    }

    fn restore<'a>(&'a mut self, batch: &'a [KeySnapshot]) -> BoxFuture<'a, ()> {
        let fail =
            self.fail_op == Some("RESTORE") && self.restore_batches >= self.restores_before_failure;
        if !fail {
            self.restore_batches += 1;
            let mut contents = self.contents.lock().unwrap();
            for snap in batch {
                // Overwrite unconditionally, like RESTORE REPLACE.
                contents.insert(snap.key.clone(), (snap.dump.clone(), snap.ttl));
            }
        }
        Box::pin(async move {
            if fail {
                return Err(MigrationError::redis_msg("RESTORE", "injected failure"));
            }
            Ok(())
        })
    }
}
