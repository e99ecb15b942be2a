//! Per-project locking for the shared working-copy cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A registry of mutexes keyed by project identifier.
///
/// Work for the same key is serialized; different keys never contend
/// beyond the brief registry lookup. Entries are dropped once no caller
/// holds or waits on them.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let lock = self
            .registry()
            .entry(key.to_string())
            .or_default()
            .clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };

        let mut registry = self.registry();
        // One reference in the map, one here: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            registry.remove(key);
        }

        result
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
