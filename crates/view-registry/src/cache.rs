//! Instance cache substrates

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::item::ItemView;

/// Key-value store backing the instantiation cache.
///
/// Eviction policy and thresholds belong to the store; an entry may
/// disappear between any two calls. Resolvers treat a missing entry as a
/// plain miss, never an error.
pub trait CacheStore: Send + Sync {
    /// Get the cached view for `key`, if present.
    fn get(&self, key: &str) -> Option<Arc<dyn ItemView>>;

    /// Store a view under `key`, replacing any previous entry.
    fn insert(&self, key: String, item: Arc<dyn ItemView>);

    /// Drop every entry.
    fn clear(&self);

    /// Count of currently cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Arc<dyn ItemView>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Arc<dyn ItemView>> {
        self.entries.read().get(key).cloned()
    }

    fn insert(&self, key: String, item: Arc<dyn ItemView>) {
        self.entries.write().insert(key, item);
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Capacity-limited store that evicts an arbitrary entry when full.
pub struct BoundedStore {
    capacity: usize,
    entries: RwLock<HashMap<String, Arc<dyn ItemView>>>,
}

impl BoundedStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl CacheStore for BoundedStore {
    fn get(&self, key: &str) -> Option<Arc<dyn ItemView>> {
        self.entries.read().get(key).cloned()
    }

    fn insert(&self, key: String, item: Arc<dyn ItemView>) {
        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            // Map iteration order stands in for an eviction policy.
            if let Some(victim) = entries.keys().next().cloned() {
                tracing::trace!(key = %victim, "evicting cached view");
                entries.remove(&victim);
            }
        }
        entries.insert(key, item);
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
