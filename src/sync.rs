//! Synchronization primitives.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Per-key async mutex.
///
/// Operations on different keys proceed concurrently while operations on the
/// same key are serialized. Entries are never evicted, so the key space must be
/// bounded by the caller (the agent registry keys it by registered agent type).
///
/// ```ignore
/// let locks = KeyedLocks::new();
/// let lock = locks.get("chat");
/// let _guard = lock.lock().await;
/// // a second `locks.get("chat").lock().await` waits here
/// ```
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for `key`.
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
