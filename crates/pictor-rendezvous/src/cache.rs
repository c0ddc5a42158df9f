//! Fingerprint-keyed result cache.
//!
//! Lets an adapter's "skip interactive step" mode short-circuit the
//! rendezvous entirely: while the input fingerprint matches the one
//! stored with the last accepted result, that result is returned
//! without renotifying the browser. Any mismatch invalidates the entry
//! and forces a fresh rendezvous.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pictor_core::{Fingerprint, NodeId};

/// Tracing target for cache operations.
const TRACING_TARGET: &str = "pictor_rendezvous::cache";

/// One cached result with the input fingerprint it was produced from.
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
    fingerprint: Fingerprint,
    value: R,
    stored_at: jiff::Timestamp,
}

impl<R> CacheEntry<R> {
    /// Fingerprint of the input the cached value was accepted for.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// When the value was stored.
    #[must_use]
    pub fn stored_at(&self) -> jiff::Timestamp {
        self.stored_at
    }
}

/// Per-node result cache keyed by input fingerprint.
///
/// One instance per coordinator, shared across adapters; entries are
/// namespaced by node id so two nodes of the same type never observe
/// each other's results.
#[derive(Debug)]
pub struct ResultCache<R> {
    entries: Mutex<HashMap<NodeId, CacheEntry<R>>>,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: Clone> ResultCache<R> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<NodeId, CacheEntry<R>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached result for `id` if its stored fingerprint
    /// matches `fingerprint`.
    ///
    /// A mismatch removes the entry: the input changed, so the stored
    /// result can never become valid again.
    #[must_use]
    pub fn get(&self, id: &NodeId, fingerprint: &Fingerprint) -> Option<R> {
        let mut entries = self.table();
        match entries.get(id) {
            Some(entry) if entry.fingerprint == *fingerprint => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(id);
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    "input changed; cache entry invalidated"
                );
                None
            }
            None => None,
        }
    }

    /// Stores `value` as the accepted result for `id` at `fingerprint`,
    /// replacing any previous entry.
    pub fn put(&self, id: NodeId, fingerprint: Fingerprint, value: R) {
        let entry = CacheEntry {
            fingerprint,
            value,
            stored_at: jiff::Timestamp::now(),
        };
        self.table().insert(id, entry);
    }

    /// Removes the entry for `id`, returning whether one existed.
    pub fn remove(&self, id: &NodeId) -> bool {
        self.table().remove(id).is_some()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(payload: &[u8]) -> Fingerprint {
        Fingerprint::of(payload)
    }

    #[test]
    fn round_trip_with_matching_fingerprint() {
        let cache = ResultCache::new();
        let id = NodeId::new("7");

        cache.put(id.clone(), digest(b"input"), "result".to_owned());
        assert_eq!(
            cache.get(&id, &digest(b"input")),
            Some("result".to_owned())
        );
    }

    #[test]
    fn mismatch_invalidates_the_entry() {
        let cache = ResultCache::new();
        let id = NodeId::new("7");

        cache.put(id.clone(), digest(b"input"), "result".to_owned());
        assert_eq!(cache.get(&id, &digest(b"changed")), None);

        // The entry is gone even for the original fingerprint.
        assert_eq!(cache.get(&id, &digest(b"input")), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_are_namespaced_by_node() {
        let cache = ResultCache::new();

        cache.put(NodeId::new("a"), digest(b"x"), 1u8);
        cache.put(NodeId::new("b"), digest(b"x"), 2u8);

        assert_eq!(cache.get(&NodeId::new("a"), &digest(b"x")), Some(1));
        assert_eq!(cache.get(&NodeId::new("b"), &digest(b"x")), Some(2));
    }

    #[test]
    fn put_replaces_previous_entry() {
        let cache = ResultCache::new();
        let id = NodeId::new("7");

        cache.put(id.clone(), digest(b"v1"), "old".to_owned());
        cache.put(id.clone(), digest(b"v2"), "new".to_owned());

        assert_eq!(cache.get(&id, &digest(b"v1")), None);
        // The v1 probe invalidated the entry; repopulate and check v2.
        cache.put(id.clone(), digest(b"v2"), "new".to_owned());
        assert_eq!(cache.get(&id, &digest(b"v2")), Some("new".to_owned()));
        assert_eq!(cache.len(), 1);
    }
}
