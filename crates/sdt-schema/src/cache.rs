//! # Augmentation Cache
//!
//! Memoizes serialized augmentation results per [`SchemaIdentity`], valid
//! only while the output schema's [`Fingerprint`] is unchanged. Template
//! edits leave the fingerprint alone, so the common editing case never
//! re-runs the engine.
//!
//! ## Concurrency
//!
//! The cache is an ordinary value: construct one, share it behind an
//! `Arc`. Lookups and stores lock the map briefly; two concurrent misses
//! for the same identity both compute, and the later `store` wins. Results
//! are deterministic for a given fingerprint, so this only wastes work.
//!
//! Entries are never evicted. There is one entry per distinct identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use sdt_core::{Fingerprint, SchemaIdentity};

/// A cached result and the fingerprint it was computed from.
#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: Fingerprint,
    result: Arc<str>,
}

/// Counters exposed for instrumentation and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub entries: usize,
}

/// Fingerprint-validated store of augmentation results.
#[derive(Debug, Default)]
pub struct AugmentationCache {
    entries: RwLock<HashMap<SchemaIdentity, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl AugmentationCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached result for `identity`, if one was stored under exactly
    /// `fingerprint`.
    pub fn lookup(&self, identity: &SchemaIdentity, fingerprint: &Fingerprint) -> Option<Arc<str>> {
        let found = self
            .entries
            .read()
            .get(identity)
            .filter(|entry| entry.fingerprint == *fingerprint)
            .map(|entry| Arc::clone(&entry.result));

        match found {
            Some(result) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%identity, %fingerprint, "augmentation cache hit");
                Some(result)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%identity, %fingerprint, "augmentation cache miss");
                None
            }
        }
    }

    /// Record `result` for `identity`, replacing any previous entry.
    pub fn store(
        &self,
        identity: SchemaIdentity,
        fingerprint: Fingerprint,
        result: impl Into<Arc<str>>,
    ) -> Arc<str> {
        let result = result.into();
        self.entries.write().insert(
            identity,
            CacheEntry {
                fingerprint,
                result: Arc::clone(&result),
            },
        );
        self.stores.fetch_add(1, Ordering::Relaxed);
        result
    }

    /// Number of identities with an entry.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
