//! In-process cache store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::CacheStore;

/// A stored value with its optional deadline.
#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Mutex-guarded in-memory [`CacheStore`].
///
/// Expired entries are dropped when read and swept on every write. A TTL too
/// large to represent as an [`Instant`] is stored without expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_live(Instant::now()) {
            return Some(entry.value.clone());
        }
        entries.remove(key);
        None
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let now = Instant::now();
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("page_a", b"<html>a</html>", None);
        assert!(cache.has("page_a"));
        assert_eq!(cache.get("page_a"), Some(b"<html>a</html>".to_vec()));
    }

    #[test]
    fn test_missing_key() {
        let cache = MemoryCache::new();

        assert!(!cache.has("nope"));
        assert_eq!(cache.get("nope"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let cache = MemoryCache::new();

        cache.set("key", b"first", None);
        cache.set("key", b"second", Some(Duration::from_secs(3600)));

        assert_eq!(cache.get("key"), Some(b"second".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_elapsed_ttl_is_a_miss_and_evicts() {
        let cache = MemoryCache::new();

        cache.set("key", b"stale", Some(Duration::ZERO));

        assert!(!cache.has("key"));
        assert_eq!(cache.get("key"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let cache = MemoryCache::new();

        cache.set("key", b"forever", Some(Duration::MAX));
        assert_eq!(cache.get("key"), Some(b"forever".to_vec()));
    }

    #[test]
    fn test_write_sweeps_expired_entries() {
        let cache = MemoryCache::new();

        cache.set("page_old", b"stale", Some(Duration::ZERO));
        cache.set("page_kept", b"kept", None);
        cache.set("page_new", b"fresh", Some(Duration::from_secs(3600)));

        assert_eq!(cache.len(), 2);
        assert!(!cache.has("page_old"));
        assert!(cache.has("page_kept"));
    }

    #[test]
    fn test_long_ttl_is_live() {
        let cache = MemoryCache::new();

        cache.set("key", b"fresh", Some(Duration::from_secs(3600)));
        assert_eq!(cache.get("key"), Some(b"fresh".to_vec()));
    }
}
