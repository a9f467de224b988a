//! Memo table for compiled results.
//!
//! Entries persist for the lifetime of the table instance; there is no
//! eviction and no expiry. `clear` swaps in a whole new table rather than
//! removing entries one by one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe mapping from an opaque cache key to a computed result.
pub struct MemoTable<T> {
    entries: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> Clone for MemoTable<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: Clone> Default for MemoTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoTable<T> {
    /// Create an empty memo table.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Get a clone of the entry for a key.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.read().get(key).cloned()
    }

    /// Store an entry under a key, overwriting any previous value.
    pub fn set(&self, key: &str, value: T) {
        self.entries.write().insert(key.to_string(), value);
    }

    /// Atomically replace the whole table with an empty one.
    pub fn clear(&self) {
        *self.entries.write() = HashMap::new();
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss() {
        let table: MemoTable<String> = MemoTable::new();
        assert!(!table.has("missing"));
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_set_and_get() {
        let table = MemoTable::new();
        table.set("key", "value".to_string());
        assert!(table.has("key"));
        assert_eq!(table.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_overwrite() {
        let table = MemoTable::new();
        table.set("key", 1u32);
        table.set("key", 2u32);
        assert_eq!(table.get("key"), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_clear() {
        let table = MemoTable::new();
        table.set("a", 1u32);
        table.set("b", 2u32);
        assert_eq!(table.len(), 2);

        table.clear();
        assert!(table.is_empty());
        assert!(!table.has("a"));
    }

    #[test]
    fn test_clones_share_entries() {
        let table = MemoTable::new();
        let alias = table.clone();
        table.set("key", 7u32);
        assert_eq!(alias.get("key"), Some(7));
    }
}
